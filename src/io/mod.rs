//! I/O and coordinate-transform utilities.
//!
//! This module provides:
//! - **Series container**: one fixed netCDF schema for interchanging aligned
//!   time-series tables between a simulation pipeline and analysis code
//! - **Generation query**: capacity-interpolated extraction from
//!   region/technology source files
//! - **Rotated-pole transforms**: conversion between geographic and
//!   rotated-pole grid coordinates
//!
//! # File Formats
//!
//! ## Series Container
//!
//! ```text
//! dimensions: time, key [, <column>_strlen per text key column]
//! variables:
//!   time(time)            u32, units = "<unit> since <epoch>", tz = "unknown" | zone
//!   <group>(time, key)    f64, caller-supplied attributes
//!   <column>(key)         f64 | i64, per-key attributes
//!   <column>(key, strlen) u8, fixed-width text per-key attributes
//! ```
//!
//! ## Generation Source Files
//!
//! ```text
//! variables:
//!   time(time)                 units = "<unit> since <epoch>"
//!   total_capacity(tier)       unit
//!   total_cost(tier)           unit
//!   generation(time, tier)     region, technology, unit
//! ```
//!
//! # Example
//!
//! ```ignore
//! use res_rs::io::{GenerationFile, RotatedPole};
//!
//! // Extract generation at 450 MW from a simulated tier ladder
//! let record = GenerationFile::open("region_onshore.nc")?.query(&[450.0])?;
//!
//! // Map a site into the climate model's rotated grid
//! let (rlon, rlat) = RotatedPole::default().to_rotated(6.5, 50.9);
//! ```

mod container;
mod generation;
mod projection;

pub use container::{
    write_container, ContainerError, SeriesData, TimeSeriesContainer, DEFAULT_SERIES_NAME,
};
pub use generation::{read_generation_file, GenerationError, GenerationFile, GenerationRecord};
pub use projection::{ProjectionError, RotatedPole, TransformDirection};
