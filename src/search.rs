//! User-wide search
//!
//! Tag queries (single, conjunctive, disjunctive) and date-range queries run
//! over every album of a user. A photo filed in several albums is reported
//! once, at its first position (album order, then photo order).

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{CatalogError, CatalogResult};
use crate::model::{check_range, day_bounds, Album, Photo, SharedPhoto, Tag, User};

/// A tag predicate over photos
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagQuery {
    /// Photo carries this tag
    Single(Tag),
    /// Photo carries every one of these tags
    All(Vec<Tag>),
    /// Photo carries at least one of these tags
    Any(Vec<Tag>),
}

impl TagQuery {
    pub fn matches(&self, photo: &Photo) -> bool {
        match self {
            TagQuery::Single(tag) => photo.has_tag(tag),
            TagQuery::All(tags) => tags.iter().all(|t| photo.has_tag(t)),
            TagQuery::Any(tags) => tags.iter().any(|t| photo.has_tag(t)),
        }
    }

    fn validate(&self) -> CatalogResult<()> {
        match self {
            TagQuery::All(tags) | TagQuery::Any(tags) if tags.is_empty() => {
                Err(CatalogError::EmptyQuery)
            }
            _ => Ok(()),
        }
    }
}

impl User {
    fn distinct_photos<F>(&self, mut keep: F) -> Vec<SharedPhoto>
    where
        F: FnMut(&SharedPhoto) -> bool,
    {
        let mut seen = HashSet::new();
        let mut hits = Vec::new();
        for photo in self.albums().iter().flat_map(|a| a.photos()) {
            if keep(photo) && seen.insert(photo.file_path()) {
                hits.push(photo.clone());
            }
        }
        hits
    }

    /// Photos in any album matching a tag query
    pub fn search_by_tags(&self, query: &TagQuery) -> CatalogResult<Vec<SharedPhoto>> {
        query.validate()?;
        Ok(self.distinct_photos(|p| query.matches(&p.borrow())))
    }

    /// Photos in any album whose timestamp lies in `[start, end]`
    pub fn search_by_date(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> CatalogResult<Vec<SharedPhoto>> {
        check_range(start, end)?;
        Ok(self.distinct_photos(|p| {
            let ts = p.timestamp();
            ts >= start && ts <= end
        }))
    }

    /// Day-granular variant of [`search_by_date`](Self::search_by_date)
    pub fn search_by_days(&self, first: NaiveDate, last: NaiveDate) -> CatalogResult<Vec<SharedPhoto>> {
        let (start, end) = day_bounds(first, last)?;
        self.search_by_date(start, end)
    }

    /// Albums holding at least one photo with `tag`
    pub fn albums_with_tag(&self, tag: &Tag) -> Vec<&Album> {
        self.albums()
            .iter()
            .filter(|a| a.photos().iter().any(|p| p.borrow().has_tag(tag)))
            .collect()
    }

    /// Albums holding at least one photo dated within `[start, end]`
    pub fn albums_in_date_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> CatalogResult<Vec<&Album>> {
        check_range(start, end)?;
        Ok(self
            .albums()
            .iter()
            .filter(|a| {
                a.photos().iter().any(|p| {
                    let ts = p.timestamp();
                    ts >= start && ts <= end
                })
            })
            .collect())
    }

    /// Albums holding at least one photo whose caption contains `needle`
    pub fn albums_with_caption(&self, needle: &str) -> Vec<&Album> {
        self.albums()
            .iter()
            .filter(|a| {
                a.photos()
                    .iter()
                    .any(|p| p.borrow().caption().is_some_and(|c| c.contains(needle)))
            })
            .collect()
    }
}
