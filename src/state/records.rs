//! Serialized form of a user's catalog graph
//!
//! A user's albums, photos and tags are stored as one JSON document. Each
//! distinct photo is written once in `photos`; albums refer to photos by their
//! index in that list, so a photo filed in two albums comes back as one shared
//! handle after loading.
use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::model::{AccountKind, Album, Photo, SharedPhoto, Tag, TagTypes, User};

/// Bumped whenever the document layout changes incompatibly
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub format: u32,
    pub username: String,
    pub kind: AccountKind,
    pub tag_types: TagTypes,
    pub photos: Vec<PhotoRecord>,
    pub albums: Vec<AlbumRecord>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PhotoRecord {
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub tags: Vec<TagRecord>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TagRecord {
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AlbumRecord {
    pub name: String,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    /// Indices into [`UserRecord::photos`], in album order
    pub photos: Vec<usize>,
}

impl UserRecord {
    /// Flatten a user's graph, writing every shared photo once
    pub fn from_user(user: &User) -> Self {
        let mut index_of = HashMap::new();
        let mut photos = Vec::new();
        let mut albums = Vec::with_capacity(user.albums().len());

        for album in user.albums() {
            let mut indices = Vec::with_capacity(album.num_photos());
            for photo in album.photos() {
                let index = *index_of.entry(photo.as_ptr()).or_insert_with(|| {
                    photos.push(PhotoRecord::from_photo(&photo.borrow()));
                    photos.len() - 1
                });
                indices.push(index);
            }
            albums.push(AlbumRecord {
                name: album.name().to_string(),
                date_created: album.date_created(),
                date_modified: album.date_modified(),
                photos: indices,
            });
        }

        Self {
            format: FORMAT_VERSION,
            username: user.username().to_string(),
            kind: user.kind(),
            tag_types: user.tag_types().clone(),
            photos,
            albums,
        }
    }

    /// Rebuild the user graph, validating every reference.
    ///
    /// `username` is the key the record was stored under.
    pub fn into_user(self, username: &str) -> CatalogResult<User> {
        if self.format != FORMAT_VERSION {
            return Err(CatalogError::corrupt(
                username,
                format!("unsupported format version {}", self.format),
            ));
        }
        if self.username != username {
            return Err(CatalogError::corrupt(
                username,
                format!("record belongs to '{}'", self.username),
            ));
        }
        self.tag_types
            .validate()
            .map_err(|e| CatalogError::corrupt(username, e.to_string()))?;

        let photos = self
            .photos
            .into_iter()
            .map(|record| record.into_photo(username).map(SharedPhoto::new))
            .collect::<CatalogResult<Vec<_>>>()?;

        let mut albums: Vec<Album> = Vec::with_capacity(self.albums.len());
        for record in self.albums {
            if albums.iter().any(|a| a.name() == record.name) {
                return Err(CatalogError::corrupt(
                    username,
                    format!("duplicate album name '{}'", record.name),
                ));
            }
            let mut members: Vec<SharedPhoto> = Vec::with_capacity(record.photos.len());
            for index in record.photos {
                let photo = photos.get(index).ok_or_else(|| {
                    CatalogError::corrupt(
                        username,
                        format!("album '{}' references missing photo #{}", record.name, index),
                    )
                })?;
                if members.contains(photo) {
                    return Err(CatalogError::corrupt(
                        username,
                        format!("album '{}' lists photo #{} twice", record.name, index),
                    ));
                }
                members.push(photo.clone());
            }
            albums.push(Album::from_parts(
                record.name,
                members,
                record.date_created,
                record.date_modified,
            ));
        }

        Ok(User::from_parts(self.username, self.kind, albums, self.tag_types))
    }

    /// Convert to JSON string for database storage
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON string (from database)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl PhotoRecord {
    fn from_photo(photo: &Photo) -> Self {
        Self {
            file_path: photo.file_path().to_string(),
            caption: photo.caption().map(str::to_string),
            timestamp: photo.timestamp(),
            tags: photo
                .tags()
                .iter()
                .map(|t| TagRecord {
                    type_name: t.type_name().to_string(),
                    value: t.value().to_string(),
                })
                .collect(),
        }
    }

    fn into_photo(self, username: &str) -> CatalogResult<Photo> {
        let mut tags: Vec<Tag> = Vec::with_capacity(self.tags.len());
        for record in self.tags {
            let tag = Tag::new(record.type_name, record.value)
                .map_err(|e| CatalogError::corrupt(username, e.to_string()))?;
            if tags.contains(&tag) {
                return Err(CatalogError::corrupt(
                    username,
                    format!("photo '{}' carries tag '{}' twice", self.file_path, tag),
                ));
            }
            tags.push(tag);
        }
        Ok(Photo::from_parts(self.file_path, self.caption, self.timestamp, tags))
    }
}
