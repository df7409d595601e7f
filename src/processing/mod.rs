//! In-memory frame transformations.
//!
//! The processing layer operates on [`crate::types::Frame`] values produced by loading.
//!
//! - [`clean()`]: trim names and text cells, drop all-null columns and rows
//! - [`CleaningCache`]: memoizes [`clean()`] per frame instance
//!
//! ## Example
//!
//! ```rust
//! use table_viewer::processing::{clean, CleaningCache};
//! use table_viewer::types::{Frame, Value};
//!
//! let frame = Frame::from_columns(vec![
//!     (" name ", vec![Value::Utf8(" Alice ".into()), Value::Null]),
//!     ("empty", vec![Value::Null, Value::Null]),
//! ])
//! .unwrap();
//!
//! let cleaned = clean(&frame);
//! assert_eq!(cleaned.columns(), ["name"]);
//! assert_eq!(cleaned.row_count(), 1);
//!
//! let mut cache = CleaningCache::new();
//! let a = cache.clean(&frame);
//! let b = cache.clean(&frame);
//! assert!(std::sync::Arc::ptr_eq(&a, &b));
//! ```

pub mod cache;
pub mod clean;

pub use cache::{CacheStats, CleaningCache};
pub use clean::clean;
