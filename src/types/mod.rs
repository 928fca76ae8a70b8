//! Strongly-typed domain types for safer APIs.
//!
//! This module replaces the loosely-shaped inputs of ad-hoc scripting
//! pipelines with explicit types, so misuse fails at construction instead of
//! halfway through a file write:
//!
//! - [`TimeUnit`] / [`TimeIndex`]: time-axis encoding and the timezone tag
//! - [`TimeSeriesTable`] / [`KeyTable`]: shape-validated series and key data
//! - [`VarMeta`] / [`MetaValue`]: metadata with enumerated value kinds,
//!   validated when entries are inserted

pub mod metadata;
pub mod table;
pub mod time;

pub use metadata::{MetaValue, MetadataError, VarMeta};
pub use table::{KeyColumn, KeyColumnData, KeyTable, TableError, TimeSeriesTable};
pub use time::{TimeError, TimeIndex, TimeStep, TimeUnit, TZ_UNKNOWN};
