//! Album entity
//!
//! An ordered, duplicate-free collection of photo handles. Name uniqueness is
//! enforced by the owning [`User`](super::User), not here.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::photo::SharedPhoto;
use super::tag::Tag;
use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Clone)]
pub struct Album {
    name: String,
    photos: Vec<SharedPhoto>,
    date_created: DateTime<Utc>,
    date_modified: DateTime<Utc>,
}

impl Album {
    /// Create an empty album
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            photos: Vec::new(),
            date_created: now,
            date_modified: now,
        }
    }

    /// Create an album pre-populated with photos; duplicates are dropped
    pub fn with_photos<I, P>(name: impl Into<String>, photos: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<SharedPhoto>,
    {
        let mut album = Self::new(name);
        for photo in photos {
            let photo = photo.into();
            if !album.contains(&photo) {
                album.photos.push(photo);
            }
        }
        album
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Only the owning user renames albums, so it can keep names unique
    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn photos(&self) -> &[SharedPhoto] {
        &self.photos
    }

    pub fn num_photos(&self) -> usize {
        self.photos.len()
    }

    pub fn date_created(&self) -> DateTime<Utc> {
        self.date_created
    }

    pub fn date_modified(&self) -> DateTime<Utc> {
        self.date_modified
    }

    pub fn contains(&self, photo: &SharedPhoto) -> bool {
        self.photos.iter().any(|p| p == photo)
    }

    pub fn photo_by_path(&self, file_path: &str) -> Option<&SharedPhoto> {
        self.photos.iter().find(|p| p.borrow().file_path() == file_path)
    }

    /// Append a photo. Returns `false` (and changes nothing) if it is already here.
    ///
    /// Outside the crate, photos are filed through [`User::add_photo`](crate::model::User::add_photo)
    /// so that one path maps to one shared handle.
    pub(crate) fn add_photo(&mut self, photo: impl Into<SharedPhoto>) -> bool {
        let photo = photo.into();
        if self.contains(&photo) {
            return false;
        }
        self.photos.push(photo);
        self.touch();
        true
    }

    /// Swap each photo for the handle `existing` returns for its path, if any
    pub(crate) fn share_handles<F>(&mut self, mut existing: F)
    where
        F: FnMut(&str) -> Option<SharedPhoto>,
    {
        for slot in &mut self.photos {
            if let Some(handle) = existing(&slot.file_path()) {
                *slot = handle;
            }
        }
    }

    /// Remove a photo. Returns `false` if it was not in the album.
    pub fn remove_photo(&mut self, photo: &SharedPhoto) -> bool {
        match self.photos.iter().position(|p| p == photo) {
            Some(index) => {
                self.photos.remove(index);
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Photos carrying a tag equal to `tag`, in album order
    pub fn photos_with_tag(&self, tag: &Tag) -> Vec<SharedPhoto> {
        self.photos
            .iter()
            .filter(|p| p.borrow().has_tag(tag))
            .cloned()
            .collect()
    }

    /// Photos whose timestamp lies in `[start, end]`, in album order
    pub fn photos_in_date_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> CatalogResult<Vec<SharedPhoto>> {
        check_range(start, end)?;
        Ok(self
            .photos
            .iter()
            .filter(|p| {
                let ts = p.timestamp();
                ts >= start && ts <= end
            })
            .cloned()
            .collect())
    }

    /// Day-granular variant: from the start of `first` to the end of `last`
    pub fn photos_on_days(&self, first: NaiveDate, last: NaiveDate) -> CatalogResult<Vec<SharedPhoto>> {
        let (start, end) = day_bounds(first, last)?;
        self.photos_in_date_range(start, end)
    }

    /// Every distinct tag across the album, in first-seen order
    pub fn all_tags(&self) -> Vec<Tag> {
        let mut tags: Vec<Tag> = Vec::new();
        for photo in &self.photos {
            for tag in photo.borrow().tags() {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
        }
        tags
    }

    /// Stable ascending sort by timestamp
    pub fn sort_photos_by_date(&mut self) {
        self.photos.sort_by_key(|p| p.timestamp());
    }

    /// Stable sort by each photo's [tag signature](super::Photo::tag_signature)
    pub fn sort_photos_by_tags(&mut self) {
        let mut keyed: Vec<(String, SharedPhoto)> = self
            .photos
            .drain(..)
            .map(|p| {
                let key = p.borrow().tag_signature();
                (key, p)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        self.photos = keyed.into_iter().map(|(_, p)| p).collect();
    }

    /// Earliest and latest photo timestamps, or `None` for an empty album
    pub fn date_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let min = self.photos.iter().map(SharedPhoto::timestamp).min()?;
        let max = self.photos.iter().map(SharedPhoto::timestamp).max()?;
        Some((min, max))
    }

    fn touch(&mut self) {
        self.date_modified = Utc::now();
    }

    pub(crate) fn from_parts(
        name: String,
        photos: Vec<SharedPhoto>,
        date_created: DateTime<Utc>,
        date_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            photos,
            date_created,
            date_modified,
        }
    }
}

impl fmt::Display for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} photos", self.name, self.photos.len())?;
        if let Some((min, max)) = self.date_range() {
            write!(f, ", {} to {}", min.date(), max.date())?;
        }
        write!(f, ")")
    }
}

pub(crate) fn check_range(start: NaiveDateTime, end: NaiveDateTime) -> CatalogResult<()> {
    if start > end {
        return Err(CatalogError::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn day_bounds(first: NaiveDate, last: NaiveDate) -> CatalogResult<(NaiveDateTime, NaiveDateTime)> {
    if first > last {
        return Err(CatalogError::InvalidRange {
            start: first.to_string(),
            end: last.to_string(),
        });
    }
    let start = first
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| CatalogError::InvalidDate(first.to_string()))?;
    let end = last
        .and_hms_nano_opt(23, 59, 59, 999_999_999)
        .ok_or_else(|| CatalogError::InvalidDate(last.to_string()))?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::photo::{parse_timestamp, Photo};
    use crate::model::tag_types::TagTypes;

    fn photo(path: &str, date: &str) -> SharedPhoto {
        SharedPhoto::new(Photo::with_timestamp(path, parse_timestamp(date).unwrap()))
    }

    fn paths(photos: &[SharedPhoto]) -> Vec<String> {
        photos.iter().map(SharedPhoto::file_path).collect()
    }

    fn tagged(path: &str, date: &str, tags: &[(&str, &str)]) -> SharedPhoto {
        let shared = photo(path, date);
        let types = TagTypes::empty();
        for (t, v) in tags {
            shared.borrow_mut().add_tag(Tag::new(*t, *v).unwrap(), &types).unwrap();
        }
        shared
    }

    #[test]
    fn test_add_photo_ignores_duplicates() {
        let mut album = Album::new("Trip");
        assert!(album.add_photo(photo("/a.jpg", "2020-01-01")));
        assert!(!album.add_photo(photo("/a.jpg", "2022-02-02")));
        assert_eq!(album.num_photos(), 1);
    }

    #[test]
    fn test_add_updates_modified() {
        let mut album = Album::new("Trip");
        let before = album.date_modified();
        album.add_photo(photo("/a.jpg", "2020-01-01"));
        assert!(album.date_modified() >= before);
        assert_eq!(album.date_created(), before);
    }

    #[test]
    fn test_remove_photo() {
        let mut album = Album::new("Trip");
        let a = photo("/a.jpg", "2020-01-01");
        album.add_photo(a.clone());
        album.add_photo(photo("/b.jpg", "2020-01-02"));

        assert!(album.remove_photo(&a));
        assert!(!album.remove_photo(&a));
        assert_eq!(paths(album.photos()), vec!["/b.jpg"]);
    }

    #[test]
    fn test_photos_in_date_range_inclusive() {
        let album = Album::with_photos(
            "Trip",
            [
                photo("/a.jpg", "2020-01-01"),
                photo("/b.jpg", "2021-01-01"),
                photo("/c.jpg", "2020-06-15"),
            ],
        );
        let hits = album
            .photos_in_date_range(
                parse_timestamp("2020-01-01").unwrap(),
                parse_timestamp("2020-12-31").unwrap(),
            )
            .unwrap();
        assert_eq!(paths(&hits), vec!["/a.jpg", "/c.jpg"]);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let album = Album::new("Trip");
        let err = album
            .photos_in_date_range(
                parse_timestamp("2021-01-01").unwrap(),
                parse_timestamp("2020-01-01").unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRange { .. }));
    }

    #[test]
    fn test_photos_on_days_covers_whole_last_day() {
        let album = Album::with_photos(
            "Trip",
            [photo("/a.jpg", "2020-12-31 23:30:00"), photo("/b.jpg", "2021-01-01")],
        );
        let day = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
        let hits = album.photos_on_days(day, day).unwrap();
        assert_eq!(paths(&hits), vec!["/a.jpg"]);
    }

    #[test]
    fn test_photos_with_tag_and_all_tags() {
        let album = Album::with_photos(
            "Trip",
            [
                tagged("/a.jpg", "2020-01-01", &[("person", "Ann"), ("location", "Oslo")]),
                tagged("/b.jpg", "2020-01-02", &[("location", "Rome")]),
                tagged("/c.jpg", "2020-01-03", &[("person", "Ann")]),
            ],
        );
        let ann = Tag::new("person", "Ann").unwrap();
        assert_eq!(paths(&album.photos_with_tag(&ann)), vec!["/a.jpg", "/c.jpg"]);

        let all: Vec<String> = album.all_tags().iter().map(Tag::to_string).collect();
        assert_eq!(all, vec!["person: Ann", "location: Oslo", "location: Rome"]);
    }

    #[test]
    fn test_sort_by_date_is_stable_and_idempotent() {
        let mut album = Album::with_photos(
            "Trip",
            [
                photo("/late.jpg", "2021-01-01"),
                photo("/tie1.jpg", "2020-05-05"),
                photo("/early.jpg", "2019-01-01"),
                photo("/tie2.jpg", "2020-05-05"),
            ],
        );
        album.sort_photos_by_date();
        let once = paths(album.photos());
        assert_eq!(once, vec!["/early.jpg", "/tie1.jpg", "/tie2.jpg", "/late.jpg"]);

        album.sort_photos_by_date();
        assert_eq!(paths(album.photos()), once);
    }

    #[test]
    fn test_sort_by_tags_is_stable_and_idempotent() {
        let mut album = Album::with_photos(
            "Trip",
            [
                tagged("/p.jpg", "2020-01-01", &[("person", "Zoe")]),
                tagged("/none1.jpg", "2020-01-01", &[]),
                tagged("/l.jpg", "2020-01-01", &[("location", "Oslo")]),
                tagged("/none2.jpg", "2020-01-01", &[]),
            ],
        );
        album.sort_photos_by_tags();
        let once = paths(album.photos());
        assert_eq!(once, vec!["/none1.jpg", "/none2.jpg", "/l.jpg", "/p.jpg"]);

        album.sort_photos_by_tags();
        assert_eq!(paths(album.photos()), once);
    }

    #[test]
    fn test_date_range() {
        let mut album = Album::new("Trip");
        assert_eq!(album.date_range(), None);

        album.add_photo(photo("/a.jpg", "2020-06-15"));
        album.add_photo(photo("/b.jpg", "2019-01-01"));
        album.add_photo(photo("/c.jpg", "2021-03-03"));
        let (min, max) = album.date_range().unwrap();
        assert_eq!(min, parse_timestamp("2019-01-01").unwrap());
        assert_eq!(max, parse_timestamp("2021-03-03").unwrap());
        assert_eq!(album.to_string(), "Trip (3 photos, 2019-01-01 to 2021-03-03)");
    }
}
