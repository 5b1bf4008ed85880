//! Folder import
//!
//! Walks a directory tree and files every image it finds into one album of a
//! user. Photos already known to the user (same path in another album) are
//! shared rather than duplicated.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{CatalogError, CatalogResult};
use crate::model::{Photo, SharedPhoto, User};

/// Supported image extensions (common formats plus camera RAW)
pub const IMAGE_EXTENSIONS: [&str; 17] = [
    "jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp", "heic",
    "nef", "dng", "cr2", "cr3", "arw", "raf", "orf", "rw2",
];

/// Result of a folder import operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Photos newly added to the album
    pub imported: usize,
    /// Photos the album already held
    pub skipped: usize,
    /// Files whose metadata could not be read
    pub failed: usize,
}

/// Whether a path looks like an image by its extension
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Image files under `folder`, recursively, in path order
pub fn scan_folder(folder: &Path) -> CatalogResult<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(CatalogError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", folder.display()),
        )));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_image(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    Ok(files)
}

/// Import every image under `folder` into `album_name`
pub fn import_folder(user: &mut User, album_name: &str, folder: &Path) -> CatalogResult<ImportSummary> {
    if !user.album_exists(album_name) {
        return Err(CatalogError::AlbumNotFound(album_name.to_string()));
    }

    let mut summary = ImportSummary::default();
    for path in scan_folder(folder)? {
        let photo = match user.photo_by_path(&path.to_string_lossy()) {
            Some(existing) => existing,
            None => match Photo::from_file(&path) {
                Ok(photo) => SharedPhoto::new(photo),
                Err(err) => {
                    warn!("Error importing {}: {}", path.display(), err);
                    summary.failed += 1;
                    continue;
                }
            },
        };

        let album = user
            .album_by_name_mut(album_name)
            .ok_or_else(|| CatalogError::AlbumNotFound(album_name.to_string()))?;
        if album.add_photo(photo) {
            summary.imported += 1;
        } else {
            summary.skipped += 1;
        }
    }

    info!(
        "Import into {} complete: {} new, {} skipped, {} failed",
        album_name, summary.imported, summary.skipped, summary.failed
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Album;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"data").unwrap();
    }

    #[test]
    fn test_is_image() {
        assert!(is_image(Path::new("/x/IMG_0001.JPG")));
        assert!(is_image(Path::new("/x/DSC_0001.nef")));
        assert!(!is_image(Path::new("/x/notes.txt")));
        assert!(!is_image(Path::new("/x/README")));
    }

    #[test]
    fn test_scan_folder_recurses_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.png"));
        touch(&dir.path().join("nested/a.jpg"));
        touch(&dir.path().join("notes.txt"));

        let files = scan_folder(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"b.png".to_string()));
        assert!(files.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_scan_missing_folder() {
        let err = scan_folder(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }

    #[test]
    fn test_import_shares_known_photos() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("b.jpg"));

        let mut user = User::new("alice");
        user.create_album(Album::new("All")).unwrap();
        user.create_album(Album::new("Again")).unwrap();

        let first = import_folder(&mut user, "All", dir.path()).unwrap();
        assert_eq!(first, ImportSummary { imported: 2, skipped: 0, failed: 0 });

        let repeat = import_folder(&mut user, "All", dir.path()).unwrap();
        assert_eq!(repeat.skipped, 2);

        import_folder(&mut user, "Again", dir.path()).unwrap();
        let all = user.album_by_name("All").unwrap();
        let again = user.album_by_name("Again").unwrap();
        assert!(all.photos()[0].is_same(&again.photos()[0]));
    }

    #[test]
    fn test_import_into_unknown_album() {
        let dir = tempfile::tempdir().unwrap();
        let mut user = User::new("alice");
        let err = import_folder(&mut user, "Nope", dir.path()).unwrap_err();
        assert!(matches!(err, CatalogError::AlbumNotFound(_)));
    }
}
