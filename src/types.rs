//! Core domain types shared by the indexer, the query engine and callers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Concrete category of a shared file. Every item maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Audio,
    Video,
    Image,
    Document,
    Program,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Self::Audio,
        Self::Video,
        Self::Image,
        Self::Document,
        Self::Program,
        Self::Other,
    ];
}

/// Category selector used by queries. `All` is a pseudo-category that every
/// item belongs to in addition to its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchCategory {
    #[default]
    All,
    Audio,
    Video,
    Image,
    Document,
    Program,
    Other,
}

impl SearchCategory {
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Audio => Self::Audio,
            Category::Video => Self::Video,
            Category::Image => Self::Image,
            Category::Document => Self::Document,
            Category::Program => Self::Program,
            Category::Other => Self::Other,
        }
    }

    /// Returns true if an item of `category` is selected by this search category.
    pub fn matches(self, category: Category) -> bool {
        self == Self::All || self == Self::for_category(category)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Image => "image",
            Self::Document => "document",
            Self::Program => "program",
            Self::Other => "other",
        }
    }
}

impl From<Category> for SearchCategory {
    fn from(category: Category) -> Self {
        Self::for_category(category)
    }
}

/// Metadata keys a shared file may carry.
///
/// Only the keys listed in [`FilePropertyKey::INDEXABLE`] are indexed; every
/// other key is invisible to suggestions and matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilePropertyKey {
    Album,
    Author,
    Bitrate,
    Comments,
    Company,
    Description,
    FileSize,
    Genre,
    Height,
    Length,
    Name,
    Platform,
    Quality,
    Rating,
    Title,
    TrackNumber,
    Width,
    Year,
}

impl FilePropertyKey {
    /// Keys that participate in indexing, in indexing order.
    pub const INDEXABLE: &'static [FilePropertyKey] = &[
        Self::Album,
        Self::Author,
        Self::Company,
        Self::Genre,
        Self::Platform,
        Self::Title,
        Self::Year,
    ];

    pub fn is_indexable(self) -> bool {
        Self::INDEXABLE.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Album => "album",
            Self::Author => "author",
            Self::Bitrate => "bitrate",
            Self::Comments => "comments",
            Self::Company => "company",
            Self::Description => "description",
            Self::FileSize => "file_size",
            Self::Genre => "genre",
            Self::Height => "height",
            Self::Length => "length",
            Self::Name => "name",
            Self::Platform => "platform",
            Self::Quality => "quality",
            Self::Rating => "rating",
            Self::Title => "title",
            Self::TrackNumber => "track_number",
            Self::Width => "width",
            Self::Year => "year",
        }
    }
}

/// A metadata value carried by a shared file.
///
/// Values are indexed through their `Display` rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Number(i64),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Number(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

/// A matching query: free-text keywords, a category and per-field constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchDetails {
    /// Whitespace-separated keywords; each must prefix a token of the item.
    pub query: String,
    /// Category the results are restricted to.
    pub category: SearchCategory,
    /// Per-field keywords; each word must prefix a token of that field.
    pub advanced: BTreeMap<FilePropertyKey, String>,
}

impl SearchDetails {
    pub fn new(query: impl Into<String>, category: SearchCategory) -> Self {
        Self {
            query: query.into(),
            category,
            advanced: BTreeMap::new(),
        }
    }

    pub fn with_category(mut self, category: SearchCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_field(mut self, key: FilePropertyKey, value: impl Into<String>) -> Self {
        self.advanced.insert(key, value.into());
        self
    }
}

/// Snapshot of index and topology sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of distinct items currently indexed.
    pub items: usize,
    /// Number of distinct phrases across all suggestion buckets.
    pub phrases: usize,
    /// Number of distinct tokens across all token buckets.
    pub tokens: usize,
    /// Number of friend libraries being tracked.
    pub friends: usize,
    /// Number of presence libraries being tracked.
    pub presences: usize,
}
