//! NetCDF container for multi-variable time-series datasets.
//!
//! This module defines one fixed schema (not a general netCDF layer) used to
//! interchange simulated renewable-energy series between a production
//! pipeline and analysis code:
//!
//! - Dimensions `time` and `key` (number of timestamps × number of parallel
//!   series, e.g. turbines or sites).
//! - A `time` variable of `u32` counts with a `units` attribute
//!   (`"<unit> since <epoch>"`) and a `tz` attribute (`"unknown"` for a
//!   naive source index, else the zone name).
//! - One 2-D `f64` variable per series group, shape `(time, key)`, carrying
//!   caller-supplied metadata attributes verbatim.
//! - Optional 1-D per-key attribute variables, shape `(key,)`; text columns
//!   are stored as fixed-width bytes via a per-column `<column>_strlen`
//!   dimension, numeric columns keep their native type.
//!
//! All schema validation happens before the output file is created, so a
//! rejected write leaves nothing behind. Failures after creation release the
//! file handle before the error propagates, but the partial file is not
//! guaranteed valid; callers must treat any failure as "output unusable."
//!
//! # Example
//!
//! ```rust,ignore
//! use res_rs::io::{write_container, SeriesData, TimeSeriesContainer};
//!
//! write_container("plant.nc", &SeriesData::Single(table), &varmeta, None, &keymeta, &unit)?;
//!
//! let container = TimeSeriesContainer::open("plant.nc")?;
//! let time = container.time_index()?;
//! let values = container.series_values("var")?;
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use thiserror::Error;

use crate::types::metadata::validate_name;
use crate::types::{
    KeyColumnData, KeyTable, MetaValue, TimeError, TimeIndex, TimeSeriesTable, TimeUnit, VarMeta,
};

/// Variable name used when a single unnamed series group is written.
pub const DEFAULT_SERIES_NAME: &str = "var";

/// Error type for container operations.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Misaligned indices or columns across input tables
    #[error("schema mismatch in '{table}': {detail}")]
    SchemaMismatch { table: String, detail: String },

    /// No series groups supplied
    #[error("no series groups supplied")]
    Empty,

    /// Name collides with the container's coordinate variables
    #[error("'{0}' is reserved for the container's coordinates")]
    ReservedName(String),

    /// Name is not a valid netCDF identifier
    #[error("invalid variable name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// Required variable absent from the file
    #[error("missing variable '{0}'")]
    MissingVariable(String),

    /// Required dimension absent from the file
    #[error("missing dimension '{0}'")]
    MissingDimension(String),

    /// Required attribute absent from a variable
    #[error("missing attribute '{attribute}' on variable '{variable}'")]
    MissingAttribute {
        variable: String,
        attribute: String,
    },

    /// Stored variable has an unexpected shape
    #[error("variable '{variable}': {detail}")]
    BadShape { variable: String, detail: String },

    /// Time-axis encoding or decoding failure
    #[error("time axis error: {0}")]
    Time(#[from] TimeError),

    /// NetCDF library error
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),
}

// ============================================================================
// Writer
// ============================================================================

/// The series groups to write: a single anonymous table, or named tables.
///
/// A single table is written under [`DEFAULT_SERIES_NAME`]; metadata for it
/// is looked up under that name as well.
#[derive(Clone, Debug)]
pub enum SeriesData {
    /// One series group, stored under the default variable name
    Single(TimeSeriesTable),
    /// Named series groups, each stored as its own variable
    Named(Vec<(String, TimeSeriesTable)>),
}

impl SeriesData {
    fn groups(&self) -> Vec<(&str, &TimeSeriesTable)> {
        match self {
            SeriesData::Single(table) => vec![(DEFAULT_SERIES_NAME, table)],
            SeriesData::Named(groups) => groups
                .iter()
                .map(|(name, table)| (name.as_str(), table))
                .collect(),
        }
    }
}

/// Write one or more aligned series groups (plus an optional per-key table)
/// into a single netCDF container.
///
/// Every group must share an identical time index and identical,
/// identically-ordered key labels; a supplied key table's row labels must
/// equal those key labels in the same order. All violations are rejected
/// before the output file is created or truncated.
///
/// Metadata entries are attached verbatim as variable attributes; metadata
/// supplied for names not present in the data is ignored.
///
/// Concurrent writes to the same path are not safe and must be serialized by
/// the caller.
pub fn write_container(
    path: impl AsRef<Path>,
    timedata: &SeriesData,
    varmeta: &HashMap<String, VarMeta>,
    keydata: Option<&KeyTable>,
    keymeta: &HashMap<String, VarMeta>,
    time_unit: &TimeUnit,
) -> Result<(), ContainerError> {
    let groups = timedata.groups();
    let (first_name, first) = *groups.first().ok_or(ContainerError::Empty)?;

    // All validation happens before the file is created.
    let mut seen = HashSet::new();
    for (name, _) in &groups {
        check_variable_name(name)?;
        if !seen.insert(*name) {
            return Err(ContainerError::SchemaMismatch {
                table: name.to_string(),
                detail: "duplicate series group name".to_string(),
            });
        }
    }

    for (name, table) in &groups[1..] {
        if table.keys() != first.keys() {
            return Err(ContainerError::SchemaMismatch {
                table: name.to_string(),
                detail: format!("key labels do not match series group '{first_name}'"),
            });
        }
        if table.time() != first.time() {
            return Err(ContainerError::SchemaMismatch {
                table: name.to_string(),
                detail: format!("time index does not match series group '{first_name}'"),
            });
        }
    }

    if let Some(keys) = keydata {
        if keys.index() != first.keys() {
            return Err(ContainerError::SchemaMismatch {
                table: "key table".to_string(),
                detail: "row labels do not equal the series key labels in order".to_string(),
            });
        }
        for col in keys.columns() {
            check_variable_name(&col.name)?;
            if !seen.insert(col.name.as_str()) {
                return Err(ContainerError::SchemaMismatch {
                    table: col.name.clone(),
                    detail: "key column name collides with a series group".to_string(),
                });
            }
        }
    }

    let counts = time_unit.encode(first.time().timestamps())?;

    // From here on the output file exists; the handle is dropped (and the
    // file closed) on every exit path, but a failed write leaves a partial
    // file behind that callers must discard.
    let mut file = netcdf::create(path)?;

    file.add_dimension("time", first.n_time())?;
    file.add_dimension("key", first.n_keys())?;

    {
        let mut time_var = file.add_variable::<u32>("time", &["time"])?;
        time_var.put_attribute("units", time_unit.to_string().as_str())?;
        time_var.put_attribute("tz", first.time().tz_tag())?;
        time_var.put_values(&counts, ..)?;
    }

    for (name, table) in &groups {
        let mut var = file.add_variable::<f64>(name, &["time", "key"])?;
        if let Some(meta) = varmeta.get(*name) {
            put_meta(&mut var, meta)?;
        }
        var.put_values(table.values(), ..)?;
    }

    if let Some(keys) = keydata {
        for col in keys.columns() {
            match &col.data {
                KeyColumnData::Float(values) => {
                    let mut var = file.add_variable::<f64>(&col.name, &["key"])?;
                    if let Some(meta) = keymeta.get(&col.name) {
                        put_meta(&mut var, meta)?;
                    }
                    var.put_values(values, ..)?;
                }
                KeyColumnData::Int(values) => {
                    let mut var = file.add_variable::<i64>(&col.name, &["key"])?;
                    if let Some(meta) = keymeta.get(&col.name) {
                        put_meta(&mut var, meta)?;
                    }
                    var.put_values(values, ..)?;
                }
                KeyColumnData::Text(values) => {
                    let width = values.iter().map(|s| s.len()).max().unwrap_or(0).max(1);
                    let strlen_dim = format!("{}_strlen", col.name);
                    file.add_dimension(&strlen_dim, width)?;

                    let mut buf = vec![0u8; values.len() * width];
                    for (i, s) in values.iter().enumerate() {
                        buf[i * width..i * width + s.len()].copy_from_slice(s.as_bytes());
                    }

                    let mut var =
                        file.add_variable::<u8>(&col.name, &["key", strlen_dim.as_str()])?;
                    if let Some(meta) = keymeta.get(&col.name) {
                        put_meta(&mut var, meta)?;
                    }
                    var.put_values(&buf, ..)?;
                }
            }
        }
    }

    Ok(())
}

fn check_variable_name(name: &str) -> Result<(), ContainerError> {
    if name == "time" || name == "key" {
        return Err(ContainerError::ReservedName(name.to_string()));
    }
    validate_name(name).map_err(|reason| ContainerError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

fn put_meta(var: &mut netcdf::VariableMut, meta: &VarMeta) -> Result<(), netcdf::Error> {
    for (key, value) in meta.iter() {
        match value {
            MetaValue::Text(s) => var.put_attribute(key, s.as_str())?,
            MetaValue::Int(i) => var.put_attribute(key, *i)?,
            MetaValue::Float(f) => var.put_attribute(key, *f)?,
        };
    }
    Ok(())
}

// ============================================================================
// Reader
// ============================================================================

/// Read-only view of a container written by [`write_container`].
///
/// The underlying file handle is released when the value is dropped, on every
/// exit path.
pub struct TimeSeriesContainer {
    file: netcdf::File,
}

impl TimeSeriesContainer {
    /// Open a container file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ContainerError> {
        Ok(Self {
            file: netcdf::open(path)?,
        })
    }

    /// Container shape: `(n_time, n_key)`.
    pub fn dims(&self) -> Result<(usize, usize), ContainerError> {
        let n_time = self
            .file
            .dimension("time")
            .ok_or_else(|| ContainerError::MissingDimension("time".to_string()))?
            .len();
        let n_key = self
            .file
            .dimension("key")
            .ok_or_else(|| ContainerError::MissingDimension("key".to_string()))?
            .len();
        Ok((n_time, n_key))
    }

    /// Decode the time axis, including the timezone tag.
    pub fn time_index(&self) -> Result<TimeIndex, ContainerError> {
        let var = self
            .file
            .variable("time")
            .ok_or_else(|| ContainerError::MissingVariable("time".to_string()))?;

        let units = attr_string(&var, "units").ok_or_else(|| ContainerError::MissingAttribute {
            variable: "time".to_string(),
            attribute: "units".to_string(),
        })?;
        let tz = attr_string(&var, "tz").ok_or_else(|| ContainerError::MissingAttribute {
            variable: "time".to_string(),
            attribute: "tz".to_string(),
        })?;

        let unit = TimeUnit::parse(&units)?;
        let counts: Vec<u32> = var.get_values(..)?;
        let timestamps = unit.decode(&counts)?;

        Ok(TimeIndex::from_tag(timestamps, &tz))
    }

    /// Read one series group's values, row-major `(time, key)`.
    pub fn series_values(&self, name: &str) -> Result<Vec<f64>, ContainerError> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| ContainerError::MissingVariable(name.to_string()))?;

        let dims = var.dimensions();
        if dims.len() != 2 || dims[0].name() != "time" || dims[1].name() != "key" {
            return Err(ContainerError::BadShape {
                variable: name.to_string(),
                detail: "expected a 2-D (time, key) variable".to_string(),
            });
        }

        Ok(var.get_values(..)?)
    }

    /// Read one attribute of a variable as a typed value.
    ///
    /// Returns `None` if the attribute is absent (or of a type this schema
    /// never writes).
    pub fn series_attribute(
        &self,
        variable: &str,
        attribute: &str,
    ) -> Result<Option<MetaValue>, ContainerError> {
        let var = self
            .file
            .variable(variable)
            .ok_or_else(|| ContainerError::MissingVariable(variable.to_string()))?;

        let value = match var.attribute_value(attribute) {
            None => return Ok(None),
            Some(value) => value?,
        };

        Ok(match value {
            netcdf::AttributeValue::Str(s) => Some(MetaValue::Text(s)),
            netcdf::AttributeValue::Double(d) => Some(MetaValue::Float(d)),
            netcdf::AttributeValue::Float(f) => Some(MetaValue::Float(f as f64)),
            netcdf::AttributeValue::Longlong(i) => Some(MetaValue::Int(i)),
            netcdf::AttributeValue::Int(i) => Some(MetaValue::Int(i as i64)),
            netcdf::AttributeValue::Short(i) => Some(MetaValue::Int(i as i64)),
            _ => None,
        })
    }

    /// Read a float-typed key-attribute column.
    pub fn key_float_column(&self, name: &str) -> Result<Vec<f64>, ContainerError> {
        let var = self.key_column_variable(name)?;
        Ok(var.get_values(..)?)
    }

    /// Read an integer-typed key-attribute column.
    pub fn key_int_column(&self, name: &str) -> Result<Vec<i64>, ContainerError> {
        let var = self.key_column_variable(name)?;
        Ok(var.get_values(..)?)
    }

    /// Read a text-typed key-attribute column, trimming the fixed-width
    /// padding.
    pub fn key_text_column(&self, name: &str) -> Result<Vec<String>, ContainerError> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| ContainerError::MissingVariable(name.to_string()))?;

        let dims = var.dimensions();
        if dims.len() != 2 || dims[0].name() != "key" {
            return Err(ContainerError::BadShape {
                variable: name.to_string(),
                detail: "expected a fixed-width (key, strlen) text variable".to_string(),
            });
        }
        let n_key = dims[0].len();
        let width = dims[1].len();

        let raw: Vec<u8> = var.get_values(..)?;
        let mut out = Vec::with_capacity(n_key);
        for i in 0..n_key {
            let cell = &raw[i * width..(i + 1) * width];
            let end = cell.iter().position(|&b| b == 0).unwrap_or(width);
            out.push(String::from_utf8_lossy(&cell[..end]).into_owned());
        }
        Ok(out)
    }

    fn key_column_variable(&self, name: &str) -> Result<netcdf::Variable<'_>, ContainerError> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| ContainerError::MissingVariable(name.to_string()))?;

        let dims = var.dimensions();
        if dims.len() != 1 || dims[0].name() != "key" {
            return Err(ContainerError::BadShape {
                variable: name.to_string(),
                detail: "expected a 1-D (key,) variable".to_string(),
            });
        }
        Ok(var)
    }
}

fn attr_string(var: &netcdf::Variable, name: &str) -> Option<String> {
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn hourly(n: usize) -> TimeIndex {
        TimeIndex::hourly(
            NaiveDate::from_ymd_opt(2015, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            n,
        )
    }

    fn table(time: TimeIndex, keys: &[&str]) -> TimeSeriesTable {
        let n = time.len() * keys.len();
        TimeSeriesTable::new(
            time,
            keys.iter().map(|k| k.to_string()).collect(),
            (0..n).map(|i| i as f64).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_mismatched_key_labels_rejected_before_creation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.nc");

        let data = SeriesData::Named(vec![
            ("wind".to_string(), table(hourly(4), &["t1", "t2"])),
            ("solar".to_string(), table(hourly(4), &["t2", "t1"])),
        ]);

        let result = write_container(
            &path,
            &data,
            &HashMap::new(),
            None,
            &HashMap::new(),
            &TimeUnit::default(),
        );

        assert!(matches!(
            result,
            Err(ContainerError::SchemaMismatch { .. })
        ));
        assert!(!path.exists(), "rejected write must not create a file");
    }

    #[test]
    fn test_mismatched_time_index_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.nc");

        let data = SeriesData::Named(vec![
            ("wind".to_string(), table(hourly(4), &["t1"])),
            ("solar".to_string(), table(hourly(5), &["t1"])),
        ]);

        let result = write_container(
            &path,
            &data,
            &HashMap::new(),
            None,
            &HashMap::new(),
            &TimeUnit::default(),
        );

        assert!(matches!(
            result,
            Err(ContainerError::SchemaMismatch { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_key_table_index_mismatch_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.nc");

        let data = SeriesData::Single(table(hourly(4), &["t1", "t2"]));
        let keys = KeyTable::new(
            vec!["t2".to_string(), "t1".to_string()],
            vec![crate::types::KeyColumn::new(
                "height",
                KeyColumnData::Float(vec![80.0, 120.0]),
            )],
        )
        .unwrap();

        let result = write_container(
            &path,
            &data,
            &HashMap::new(),
            Some(&keys),
            &HashMap::new(),
            &TimeUnit::default(),
        );

        assert!(matches!(
            result,
            Err(ContainerError::SchemaMismatch { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_reserved_names_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.nc");

        let data = SeriesData::Named(vec![("time".to_string(), table(hourly(2), &["t1"]))]);
        let result = write_container(
            &path,
            &data,
            &HashMap::new(),
            None,
            &HashMap::new(),
            &TimeUnit::default(),
        );

        assert!(matches!(result, Err(ContainerError::ReservedName(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_input_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.nc");

        let result = write_container(
            &path,
            &SeriesData::Named(Vec::new()),
            &HashMap::new(),
            None,
            &HashMap::new(),
            &TimeUnit::default(),
        );

        assert!(matches!(result, Err(ContainerError::Empty)));
        assert!(!path.exists());
    }

    #[test]
    fn test_duplicate_group_names_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.nc");

        let data = SeriesData::Named(vec![
            ("wind".to_string(), table(hourly(2), &["t1"])),
            ("wind".to_string(), table(hourly(2), &["t1"])),
        ]);

        let result = write_container(
            &path,
            &data,
            &HashMap::new(),
            None,
            &HashMap::new(),
            &TimeUnit::default(),
        );

        assert!(matches!(
            result,
            Err(ContainerError::SchemaMismatch { .. })
        ));
        assert!(!path.exists());
    }
}
