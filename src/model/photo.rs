//! Photo entity
//!
//! A single image record: a path to the image bytes, an optional caption, a
//! timestamp and an ordered set of tags. Photos can appear in several albums
//! of the same user at once; albums hold [`SharedPhoto`] handles so that an
//! edit made through one album is visible from every other.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::rc::Rc;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

use super::tag::Tag;
use super::tag_types::{Arity, TagTypes};
use crate::error::{CatalogError, CatalogResult};

/// Accepted textual date-time layouts, tried in order after RFC 3339
const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Image metadata. Two photos with the same file path are the same photo.
#[derive(Debug, Clone)]
pub struct Photo {
    file_path: String,
    caption: Option<String>,
    timestamp: NaiveDateTime,
    tags: Vec<Tag>,
}

impl Photo {
    /// Create a photo stamped with the current local time
    pub fn new(file_path: impl Into<String>) -> Self {
        Self::with_timestamp(file_path, Local::now().naive_local())
    }

    pub fn with_timestamp(file_path: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            file_path: file_path.into(),
            caption: None,
            timestamp,
            tags: Vec::new(),
        }
    }

    /// Create a photo for an image on disk, dated by its last modification time
    pub fn from_file(path: &Path) -> CatalogResult<Self> {
        let modified = std::fs::metadata(path)?.modified()?;
        let timestamp = DateTime::<Local>::from(modified).naive_local();
        Ok(Self::with_timestamp(
            path.to_string_lossy().to_string(),
            timestamp,
        ))
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Path changes go through [`User::set_photo_path`](crate::model::User::set_photo_path),
    /// which keeps paths unique across the user's albums.
    pub(crate) fn set_file_path(&mut self, file_path: impl Into<String>) {
        self.file_path = file_path.into();
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// Set or clear the caption; an empty caption clears it
    pub fn set_caption(&mut self, caption: impl Into<String>) {
        let caption = caption.into();
        self.caption = if caption.is_empty() { None } else { Some(caption) };
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: NaiveDateTime) {
        self.timestamp = timestamp;
    }

    /// Parse and set the photo date. The photo is untouched on failure.
    pub fn set_date(&mut self, value: &str) -> CatalogResult<()> {
        self.timestamp = parse_timestamp(value)?;
        Ok(())
    }

    /// Tags in insertion order
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    pub fn has_tag_of_type(&self, type_name: &str) -> bool {
        self.tags.iter().any(|t| t.type_name() == type_name)
    }

    fn count_of_type(&self, type_name: &str) -> usize {
        self.tags.iter().filter(|t| t.type_name() == type_name).count()
    }

    /// Add a tag.
    ///
    /// Returns `Ok(false)` if an equal tag is already present. Fails with
    /// `TagArityExceeded` when the type's limit in `tag_types` is reached.
    pub fn add_tag(&mut self, tag: Tag, tag_types: &TagTypes) -> CatalogResult<bool> {
        if self.has_tag(&tag) {
            return Ok(false);
        }
        check_arity(&tag, self.count_of_type(tag.type_name()), tag_types)?;
        self.tags.push(tag);
        Ok(true)
    }

    /// Remove a tag. Returns whether it was present.
    pub fn delete_tag(&mut self, tag: &Tag) -> bool {
        match self.tags.iter().position(|t| t == tag) {
            Some(index) => {
                self.tags.remove(index);
                true
            }
            None => false,
        }
    }

    /// Swap `old` for `new` at the same position.
    ///
    /// Returns `Ok(false)` if `old` is absent. If `new` is already carried the
    /// old tag is simply dropped.
    pub fn replace_tag(&mut self, old: &Tag, new: Tag, tag_types: &TagTypes) -> CatalogResult<bool> {
        let Some(index) = self.tags.iter().position(|t| t == old) else {
            return Ok(false);
        };
        if old == &new {
            return Ok(true);
        }
        if self.has_tag(&new) {
            self.tags.remove(index);
            return Ok(true);
        }
        // the tag being replaced no longer counts against the new type's limit
        let mut count = self.count_of_type(new.type_name());
        if old.type_name() == new.type_name() {
            count -= 1;
        }
        check_arity(&new, count, tag_types)?;
        self.tags[index] = new;
        Ok(true)
    }

    /// Canonical form of the tag set used to order photos by tags:
    /// `type: value` entries joined with `", "` in tag order.
    pub fn tag_signature(&self) -> String {
        self.tags
            .iter()
            .map(Tag::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn from_parts(
        file_path: String,
        caption: Option<String>,
        timestamp: NaiveDateTime,
        tags: Vec<Tag>,
    ) -> Self {
        Self {
            file_path,
            caption,
            timestamp,
            tags,
        }
    }
}

impl PartialEq for Photo {
    fn eq(&self, other: &Self) -> bool {
        self.file_path == other.file_path
    }
}

impl Eq for Photo {}

impl Hash for Photo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.file_path.hash(state);
    }
}

fn check_arity(tag: &Tag, count: usize, tag_types: &TagTypes) -> CatalogResult<()> {
    match tag_types.arity(tag.type_name()) {
        Some(arity @ Arity::Limited(limit)) if !arity.admits(count) => {
            Err(CatalogError::TagArityExceeded {
                type_name: tag.type_name().to_string(),
                limit,
            })
        }
        _ => Ok(()),
    }
}

/// Parse an RFC 3339 timestamp, a `YYYY-MM-DD[ T]HH:MM[:SS]` date-time or a
/// bare `YYYY-MM-DD` date (start of day).
pub fn parse_timestamp(value: &str) -> CatalogResult<NaiveDateTime> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.naive_local());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| CatalogError::InvalidDate(value.to_string()))
}

/// Reference-counted handle to a photo shared between albums.
///
/// Equality follows [`Photo`] equality (file path).
#[derive(Clone)]
pub struct SharedPhoto(Rc<RefCell<Photo>>);

impl SharedPhoto {
    pub fn new(photo: Photo) -> Self {
        Self(Rc::new(RefCell::new(photo)))
    }

    pub fn borrow(&self) -> Ref<'_, Photo> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Photo> {
        self.0.borrow_mut()
    }

    pub fn file_path(&self) -> String {
        self.0.borrow().file_path.clone()
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.0.borrow().timestamp
    }

    /// Whether both handles point at the very same record
    pub fn is_same(&self, other: &SharedPhoto) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live handles, one per album slot plus any held by callers
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub(crate) fn as_ptr(&self) -> *const RefCell<Photo> {
        Rc::as_ptr(&self.0)
    }
}

impl From<Photo> for SharedPhoto {
    fn from(photo: Photo) -> Self {
        SharedPhoto::new(photo)
    }
}

impl PartialEq for SharedPhoto {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other) || *self.0.borrow() == *other.0.borrow()
    }
}

impl Eq for SharedPhoto {}

impl fmt::Debug for SharedPhoto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0.borrow(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(type_name: &str, value: &str) -> Tag {
        Tag::new(type_name, value).unwrap()
    }

    #[test]
    fn test_add_then_delete_restores_tags() {
        let types = TagTypes::default();
        let mut photo = Photo::new("/photos/a.jpg");
        photo.add_tag(tag("person", "Ann"), &types).unwrap();
        let before = photo.tags().to_vec();

        let extra = tag("person", "Bob");
        assert!(photo.add_tag(extra.clone(), &types).unwrap());
        assert!(photo.delete_tag(&extra));
        assert_eq!(photo.tags(), before.as_slice());
    }

    #[test]
    fn test_duplicate_tag_is_noop() {
        let types = TagTypes::default();
        let mut photo = Photo::new("/photos/a.jpg");
        assert!(photo.add_tag(tag("person", "Ann"), &types).unwrap());
        assert!(!photo.add_tag(tag("person", "Ann"), &types).unwrap());
        assert_eq!(photo.tags().len(), 1);
    }

    #[test]
    fn test_single_valued_type_rejects_second_value() {
        let types = TagTypes::default();
        let mut photo = Photo::new("/photos/a.jpg");
        photo.add_tag(tag("location", "Paris"), &types).unwrap();

        let err = photo.add_tag(tag("location", "Rome"), &types).unwrap_err();
        assert!(matches!(err, CatalogError::TagArityExceeded { limit: 1, .. }));
        assert_eq!(photo.tags(), &[tag("location", "Paris")]);
    }

    #[test]
    fn test_unregistered_type_is_unconstrained() {
        let types = TagTypes::default();
        let mut photo = Photo::new("/photos/a.jpg");
        photo.add_tag(tag("event", "Wedding"), &types).unwrap();
        photo.add_tag(tag("event", "Birthday"), &types).unwrap();
        assert_eq!(photo.tags().len(), 2);
    }

    #[test]
    fn test_delete_absent_tag_is_noop() {
        let mut photo = Photo::new("/photos/a.jpg");
        assert!(!photo.delete_tag(&tag("person", "Ann")));
    }

    #[test]
    fn test_has_tag_of_type() {
        let mut photo = Photo::new("/photos/a.jpg");
        photo.add_tag(tag("person", "Ann"), &TagTypes::default()).unwrap();
        assert!(photo.has_tag_of_type("person"));
        assert!(!photo.has_tag_of_type("location"));
    }

    #[test]
    fn test_replace_single_valued_tag_keeps_position() {
        let types = TagTypes::default();
        let mut photo = Photo::new("/photos/a.jpg");
        photo.add_tag(tag("location", "Paris"), &types).unwrap();
        photo.add_tag(tag("person", "Ann"), &types).unwrap();

        let replaced = photo
            .replace_tag(&tag("location", "Paris"), tag("location", "Rome"), &types)
            .unwrap();
        assert!(replaced);
        assert_eq!(photo.tags(), &[tag("location", "Rome"), tag("person", "Ann")]);
    }

    #[test]
    fn test_replace_respects_arity_of_new_type() {
        let types = TagTypes::default();
        let mut photo = Photo::new("/photos/a.jpg");
        photo.add_tag(tag("location", "Paris"), &types).unwrap();
        photo.add_tag(tag("person", "Ann"), &types).unwrap();

        let result = photo.replace_tag(&tag("person", "Ann"), tag("location", "Rome"), &types);
        assert!(result.is_err());
        assert_eq!(photo.tags().len(), 2);
    }

    #[test]
    fn test_set_date() {
        let mut photo = Photo::new("/photos/a.jpg");
        photo.set_date("2020-06-15").unwrap();
        assert_eq!(photo.timestamp().to_string(), "2020-06-15 00:00:00");

        photo.set_date("2021-01-02T10:30:00").unwrap();
        assert_eq!(photo.timestamp().to_string(), "2021-01-02 10:30:00");

        let err = photo.set_date("2021-13-40").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidDate(_)));
        assert_eq!(photo.timestamp().to_string(), "2021-01-02 10:30:00");
    }

    #[test]
    fn test_caption() {
        let mut photo = Photo::new("/photos/a.jpg");
        assert_eq!(photo.caption(), None);
        photo.set_caption("Sunset");
        assert_eq!(photo.caption(), Some("Sunset"));
        photo.set_caption("");
        assert_eq!(photo.caption(), None);
    }

    #[test]
    fn test_equality_by_path() {
        let mut a = Photo::new("/photos/a.jpg");
        a.set_caption("one");
        let b = Photo::with_timestamp("/photos/a.jpg", parse_timestamp("2000-01-01").unwrap());
        assert_eq!(a, b);
        assert_ne!(a, Photo::new("/photos/b.jpg"));
    }

    #[test]
    fn test_set_file_path_changes_identity() {
        let mut a = Photo::new("/photos/a.jpg");
        a.set_file_path("/photos/b.jpg");
        assert_eq!(a.file_path(), "/photos/b.jpg");
        assert_eq!(a, Photo::new("/photos/b.jpg"));
        assert_ne!(a, Photo::new("/photos/a.jpg"));
    }

    #[test]
    fn test_shared_handle_sees_edits() {
        let shared = SharedPhoto::new(Photo::new("/photos/a.jpg"));
        let alias = shared.clone();
        alias.borrow_mut().set_caption("edited");

        assert!(shared.is_same(&alias));
        assert_eq!(shared.borrow().caption(), Some("edited"));
        assert_eq!(shared.handle_count(), 2);
    }

    #[test]
    fn test_tag_signature() {
        let types = TagTypes::default();
        let mut photo = Photo::new("/photos/a.jpg");
        assert_eq!(photo.tag_signature(), "");
        photo.add_tag(tag("person", "Ann"), &types).unwrap();
        photo.add_tag(tag("location", "Oslo"), &types).unwrap();
        assert_eq!(photo.tag_signature(), "person: Ann, location: Oslo");
    }

    #[test]
    fn test_from_file_uses_modification_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.jpg");
        std::fs::write(&path, b"jpeg").unwrap();

        let photo = Photo::from_file(&path).unwrap();
        assert_eq!(photo.file_path(), path.to_string_lossy());
        assert!(photo.timestamp() <= Local::now().naive_local());
    }
}
