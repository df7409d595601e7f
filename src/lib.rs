//! `table-viewer` loads tabular files from a data directory into an in-memory
//! [`types::Frame`], cleans them, and renders them as text.
//!
//! The primary entrypoint is [`ingestion::load_from_path`], which picks a reader from the file
//! extension and turns every failure into a [`LoadError`] whose message is fit for the user.
//!
//! ## What you can load
//!
//! **File formats (chosen by lowercased extension):**
//!
//! - **CSV**: `.csv`, delimiter detected from the first 1024 characters (`,` then `$`, else `;`)
//! - **Excel** (requires the Cargo feature `excel`, on by default): `.xlsx`, first sheet
//! - **SAS dataset**: `.sas7bdat`, plain, RLE- and RDC-compressed
//! - **SAS transport**: `.xpt`, XPORT v5 and v8
//!
//! Column types are inferred per column (`Int64`, `Float64`, `Bool`, else text) for text formats;
//! binary formats carry their own types. Empty cells and NA-like tokens become [`types::Value::Null`].
//!
//! ## Quick example: load, clean, render
//!
//! ```no_run
//! use table_viewer::ingestion::read;
//! use table_viewer::processing::clean;
//! use table_viewer::view::{columns_line, shape_line};
//!
//! # fn main() -> Result<(), table_viewer::LoadError> {
//! let frame = clean(&read("data/people.csv")?);
//! println!("{}", shape_line(&frame));
//! println!("{}", columns_line(&frame));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: unified loading entrypoint and format-specific readers
//! - [`processing`]: cleaning and the per-instance cleaning cache
//! - [`scan`]: discovery of loadable files under a directory
//! - [`view`]: plain-text rendering of outcomes
//! - [`types`]: the in-memory frame
//! - [`error`]: error types

pub mod error;
pub mod ingestion;
pub mod processing;
pub mod scan;
pub mod types;
pub mod view;

pub use error::{FrameError, LoadError, LoadResult, ReadError};
pub use types::{Frame, FrameId, Value};
