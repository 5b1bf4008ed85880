use anyhow::Context;
use tracing::info;

use photo_albums::{logging, Directory, StoreConfig};

fn main() -> anyhow::Result<()> {
    logging::init();

    let config = StoreConfig::from_env().context("failed to resolve the catalog location")?;
    let store = config
        .open_store()
        .with_context(|| format!("failed to open {}", config.database_path().display()))?;

    let directory = match config.stock_dir() {
        Some(stock_dir) => Directory::initialize_with_stock(store, stock_dir)?,
        None => Directory::initialize(store)?,
    };

    info!(
        "Catalog ready at {} with {} accounts",
        directory.store().path().display(),
        directory.accounts().len()
    );
    for account in directory.accounts() {
        info!("  {} ({})", account.username, account.kind.as_str());
    }

    directory
        .close()
        .context("failed to flush the account registry")?;
    Ok(())
}
