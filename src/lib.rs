//! # res-rs
//!
//! Data interchange and transform utilities for renewable-energy time-series
//! analysis.
//!
//! This crate provides the core plumbing between a renewable-energy
//! simulation pipeline and analysis code:
//! - A self-describing netCDF container for aligned multi-variable
//!   time-series tables (writer and reader, one fixed schema)
//! - Capacity-interpolated extraction of simulated generation and cost from
//!   region/technology source files
//! - Rotated-pole grid transforms for regional climate model coordinates
//! - Series preparation helpers (leap-day stripping, linear transition ramp)

pub mod analysis;
pub mod io;
pub mod types;

// Re-export main types for convenience
pub use io::{
    read_generation_file, write_container, ContainerError, GenerationError, GenerationFile,
    GenerationRecord, ProjectionError, RotatedPole, SeriesData, TimeSeriesContainer,
    TransformDirection, DEFAULT_SERIES_NAME,
};
pub use types::{
    KeyColumn, KeyColumnData, KeyTable, MetaValue, MetadataError, TableError, TimeError,
    TimeIndex, TimeSeriesTable, TimeStep, TimeUnit, VarMeta, TZ_UNKNOWN,
};
pub use analysis::{linear_transition, remove_leap_days};
