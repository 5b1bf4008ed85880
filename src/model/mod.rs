//! Catalog data model
//!
//! User owns Albums, Albums hold shared Photo handles, Photos own their Tags.

mod album;
mod photo;
mod tag;
mod tag_types;
mod user;

pub use album::Album;
pub(crate) use album::{check_range, day_bounds};
pub use photo::{parse_timestamp, Photo, SharedPhoto};
pub use tag::Tag;
pub use tag_types::{Arity, TagTypes};
pub use user::{AccountKind, User};
