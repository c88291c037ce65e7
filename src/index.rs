//! In-memory result indexing.
//!
//! ## Module Structure
//!
//! - `tokenize` - Whitespace tokenizer and case canonicalization
//! - `fields` - Extraction of indexable (field, value) pairs from an item
//! - `phrase` - Whole-phrase buckets backing suggestions
//! - `token` - Token posting lists backing keyword matching
//! - `data` - Index data owning both indexes (IndexData)

mod data;
mod fields;
mod phrase;
mod token;
mod tokenize;

pub use data::IndexData;
pub use fields::{extract_fields, ExtractedField, IndexField};
pub use tokenize::{canonicalize, has_tokens, tokenize};
