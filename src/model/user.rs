//! User entity
//!
//! An account holder owning an ordered list of uniquely named albums and a
//! registry of recognized tag types.

use serde::{Deserialize, Serialize};

use super::album::Album;
use super::photo::{Photo, SharedPhoto};
use super::tag::Tag;
use super::tag_types::{Arity, TagTypes};
use crate::error::{CatalogError, CatalogResult};
use crate::state::library::CatalogStore;

/// Whether an account may manage other accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Regular,
    Admin,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Regular => "regular",
            AccountKind::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "regular" => Some(AccountKind::Regular),
            "admin" => Some(AccountKind::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    username: String,
    kind: AccountKind,
    albums: Vec<Album>,
    tag_types: TagTypes,
}

impl User {
    /// A regular account with the default tag types
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_kind(username, AccountKind::Regular)
    }

    pub(crate) fn with_kind(username: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            username: username.into(),
            kind,
            albums: Vec::new(),
            tag_types: TagTypes::default(),
        }
    }

    pub(crate) fn from_parts(
        username: String,
        kind: AccountKind,
        albums: Vec<Album>,
        tag_types: TagTypes,
    ) -> Self {
        Self {
            username,
            kind,
            albums,
            tag_types,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn is_admin(&self) -> bool {
        self.kind == AccountKind::Admin
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn tag_types(&self) -> &TagTypes {
        &self.tag_types
    }

    /// Register or overwrite a tag type's arity
    pub fn add_tag_type(&mut self, type_name: &str, arity: Arity) -> CatalogResult<()> {
        self.tag_types.insert(type_name, arity)
    }

    // ========================
    // Albums
    // ========================

    pub fn album_exists(&self, name: &str) -> bool {
        self.album_index(name).is_some()
    }

    pub fn album_by_name(&self, name: &str) -> Option<&Album> {
        self.albums.iter().find(|a| a.name() == name)
    }

    pub fn album_by_name_mut(&mut self, name: &str) -> Option<&mut Album> {
        self.albums.iter_mut().find(|a| a.name() == name)
    }

    fn album_index(&self, name: &str) -> Option<usize> {
        self.albums.iter().position(|a| a.name() == name)
    }

    fn require_album(&self, name: &str) -> CatalogResult<usize> {
        self.album_index(name)
            .ok_or_else(|| CatalogError::AlbumNotFound(name.to_string()))
    }

    /// Add an album. Its name must not be used by another album of this user.
    ///
    /// Photos whose path is already filed elsewhere are replaced by the
    /// existing handle.
    pub fn create_album(&mut self, mut album: Album) -> CatalogResult<&mut Album> {
        if self.album_exists(album.name()) {
            return Err(CatalogError::DuplicateAlbumName(album.name().to_string()));
        }
        album.share_handles(|path| self.photo_by_path(path));
        self.albums.push(album);
        let last = self.albums.len() - 1;
        Ok(&mut self.albums[last])
    }

    /// Build a new album from a set of photos, e.g. search results.
    ///
    /// The album keeps the same handles, so the photos stay shared.
    pub fn create_album_from_photos(
        &mut self,
        name: &str,
        photos: &[SharedPhoto],
    ) -> CatalogResult<&mut Album> {
        self.create_album(Album::with_photos(name, photos.iter().cloned()))
    }

    /// Drop an album. The image files it referenced are not touched.
    pub fn delete_album(&mut self, name: &str) -> CatalogResult<Album> {
        let index = self.require_album(name)?;
        Ok(self.albums.remove(index))
    }

    pub fn rename_album(&mut self, name: &str, new_name: &str) -> CatalogResult<()> {
        let index = self.require_album(name)?;
        if name == new_name {
            return Ok(());
        }
        if self.album_exists(new_name) {
            return Err(CatalogError::DuplicateAlbumName(new_name.to_string()));
        }
        self.albums[index].set_name(new_name);
        Ok(())
    }

    // ========================
    // Photos across albums
    // ========================

    /// The shared handle for a photo path, wherever it is filed
    pub fn photo_by_path(&self, file_path: &str) -> Option<SharedPhoto> {
        self.albums
            .iter()
            .find_map(|a| a.photo_by_path(file_path))
            .cloned()
    }

    /// File a photo into `album`.
    ///
    /// If a photo with the same path is already in any album, that handle is
    /// filed instead and `photo` is dropped. Returns `false` if the album
    /// already holds it.
    pub fn add_photo(&mut self, album: &str, photo: Photo) -> CatalogResult<bool> {
        let index = self.require_album(album)?;
        let photo = self
            .photo_by_path(photo.file_path())
            .unwrap_or_else(|| SharedPhoto::new(photo));
        Ok(self.albums[index].add_photo(photo))
    }

    /// Remove a photo from one album. Other albums keep their handle.
    pub fn remove_photo(&mut self, album: &str, file_path: &str) -> CatalogResult<()> {
        let index = self.require_album(album)?;
        let photo = self.photo_in(index, file_path)?;
        self.albums[index].remove_photo(&photo);
        Ok(())
    }

    /// Change a photo's path, in every album that holds it.
    ///
    /// Fails with `DuplicatePhoto` if another photo of this user already uses
    /// `new_path`.
    pub fn set_photo_path(&mut self, file_path: &str, new_path: &str) -> CatalogResult<()> {
        let photo = self
            .photo_by_path(file_path)
            .ok_or_else(|| CatalogError::PhotoNotFound(file_path.to_string()))?;
        if file_path == new_path {
            return Ok(());
        }
        if self.photo_by_path(new_path).is_some() {
            return Err(CatalogError::DuplicatePhoto(new_path.to_string()));
        }
        photo.borrow_mut().set_file_path(new_path);
        Ok(())
    }

    /// Tag a photo, checking the tag against this user's tag types
    pub fn tag_photo(&self, file_path: &str, tag: Tag) -> CatalogResult<bool> {
        let photo = self
            .photo_by_path(file_path)
            .ok_or_else(|| CatalogError::PhotoNotFound(file_path.to_string()))?;
        let added = photo.borrow_mut().add_tag(tag, &self.tag_types);
        added
    }

    fn photo_in(&self, album: usize, file_path: &str) -> CatalogResult<SharedPhoto> {
        self.albums[album]
            .photo_by_path(file_path)
            .cloned()
            .ok_or_else(|| CatalogError::PhotoNotFound(file_path.to_string()))
    }

    /// File a photo of album `from` into album `to` as well.
    ///
    /// Returns `false` if `to` already holds it.
    pub fn copy_photo(&mut self, from: &str, to: &str, file_path: &str) -> CatalogResult<bool> {
        let source = self.require_album(from)?;
        let target = self.require_album(to)?;
        let photo = self.photo_in(source, file_path)?;
        Ok(self.albums[target].add_photo(photo))
    }

    /// Move a photo from album `from` to album `to`
    pub fn move_photo(&mut self, from: &str, to: &str, file_path: &str) -> CatalogResult<()> {
        let source = self.require_album(from)?;
        let target = self.require_album(to)?;
        let photo = self.photo_in(source, file_path)?;
        if source == target {
            return Ok(());
        }
        self.albums[target].add_photo(photo.clone());
        self.albums[source].remove_photo(&photo);
        Ok(())
    }

    // ========================
    // Persistence
    // ========================

    /// Persist this user's whole catalog, replacing any earlier record
    pub fn save_user_data(&self, store: &CatalogStore) -> CatalogResult<()> {
        store.save_user_data(self)
    }

    pub fn load_user_data(store: &CatalogStore, username: &str) -> CatalogResult<User> {
        store.load_user_data(username)
    }
}
