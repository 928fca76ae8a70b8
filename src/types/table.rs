//! Aligned time-series tables.
//!
//! A [`TimeSeriesTable`] is one series group: a dense 2-D block of `f64`
//! values with a shared [`TimeIndex`] down the rows and named keys (turbines,
//! sites, ...) across the columns. A [`KeyTable`] holds per-key scalar
//! attributes: one row per key, columns of text, float, or integer data.
//!
//! Both are shape-validated at construction so the container writer can rely
//! on consistent dimensions.

use thiserror::Error;

use super::time::TimeIndex;

/// Error type for table construction.
#[derive(Debug, Error)]
pub enum TableError {
    /// Value buffer does not match time × key
    #[error("table holds {actual} values but {n_time} timestamps × {n_keys} keys requires {expected}")]
    ShapeMismatch {
        actual: usize,
        expected: usize,
        n_time: usize,
        n_keys: usize,
    },

    /// Key-attribute column length differs from the key index
    #[error("column '{name}' holds {actual} rows but the key index has {expected}")]
    ColumnLength {
        name: String,
        actual: usize,
        expected: usize,
    },
}

// =============================================================================
// TimeSeriesTable
// =============================================================================

/// A dense 2-D series group: `(time, key)` values in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeriesTable {
    time: TimeIndex,
    keys: Vec<String>,
    values: Vec<f64>,
}

impl TimeSeriesTable {
    /// Create a table from a time index, key labels, and row-major values.
    ///
    /// # Errors
    /// [`TableError::ShapeMismatch`] unless `values.len() == time.len() * keys.len()`.
    pub fn new(time: TimeIndex, keys: Vec<String>, values: Vec<f64>) -> Result<Self, TableError> {
        let expected = time.len() * keys.len();
        if values.len() != expected {
            return Err(TableError::ShapeMismatch {
                actual: values.len(),
                expected,
                n_time: time.len(),
                n_keys: keys.len(),
            });
        }
        Ok(Self { time, keys, values })
    }

    /// Create a table column by column.
    ///
    /// # Errors
    /// [`TableError::ColumnLength`] if any column length differs from the
    /// time index.
    pub fn from_columns(
        time: TimeIndex,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, TableError> {
        let n_time = time.len();
        for (name, data) in &columns {
            if data.len() != n_time {
                return Err(TableError::ColumnLength {
                    name: name.clone(),
                    actual: data.len(),
                    expected: n_time,
                });
            }
        }

        let n_keys = columns.len();
        let mut values = vec![0.0; n_time * n_keys];
        for (k, (_, data)) in columns.iter().enumerate() {
            for (t, &v) in data.iter().enumerate() {
                values[t * n_keys + k] = v;
            }
        }
        let keys = columns.into_iter().map(|(name, _)| name).collect();

        Ok(Self { time, keys, values })
    }

    /// Assemble a table whose shape is already known to be consistent.
    pub(crate) fn from_parts(time: TimeIndex, keys: Vec<String>, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), time.len() * keys.len());
        Self { time, keys, values }
    }

    /// Number of timestamps (rows).
    pub fn n_time(&self) -> usize {
        self.time.len()
    }

    /// Number of keys (columns).
    pub fn n_keys(&self) -> usize {
        self.keys.len()
    }

    /// The time index.
    pub fn time(&self) -> &TimeIndex {
        &self.time
    }

    /// The key labels.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// The full value block, row-major `(time, key)`.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// A single value.
    #[inline]
    pub fn value(&self, t: usize, k: usize) -> f64 {
        self.values[t * self.keys.len() + k]
    }

    /// One row (all keys at one timestamp).
    pub fn row(&self, t: usize) -> &[f64] {
        let n = self.keys.len();
        &self.values[t * n..(t + 1) * n]
    }

    /// One column (one key's full series), copied out.
    pub fn column(&self, k: usize) -> Vec<f64> {
        let n = self.keys.len();
        self.values.iter().skip(k).step_by(n).copied().collect()
    }

    /// Position of a key label, if present.
    pub fn key_position(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }
}

// =============================================================================
// KeyTable
// =============================================================================

/// Data held by one key-attribute column.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyColumnData {
    /// Text values, stored on disk as fixed-width bytes
    Text(Vec<String>),
    /// Floating-point values, stored as `f64`
    Float(Vec<f64>),
    /// Integer values, stored as `i64`
    Int(Vec<i64>),
}

impl KeyColumnData {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            KeyColumnData::Text(v) => v.len(),
            KeyColumnData::Float(v) => v.len(),
            KeyColumnData::Int(v) => v.len(),
        }
    }

    /// Check if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One named key-attribute column.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyColumn {
    pub name: String,
    pub data: KeyColumnData,
}

impl KeyColumn {
    /// Create a named column.
    pub fn new(name: impl Into<String>, data: KeyColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Per-key scalar attributes: one row per key, in key order.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyTable {
    index: Vec<String>,
    columns: Vec<KeyColumn>,
}

impl KeyTable {
    /// Create a key table from row labels and columns.
    ///
    /// # Errors
    /// [`TableError::ColumnLength`] if any column length differs from the
    /// index.
    pub fn new(index: Vec<String>, columns: Vec<KeyColumn>) -> Result<Self, TableError> {
        for col in &columns {
            if col.data.len() != index.len() {
                return Err(TableError::ColumnLength {
                    name: col.name.clone(),
                    actual: col.data.len(),
                    expected: index.len(),
                });
            }
        }
        Ok(Self { index, columns })
    }

    /// The row labels (must equal the series tables' key labels).
    pub fn index(&self) -> &[String] {
        &self.index
    }

    /// The columns.
    pub fn columns(&self) -> &[KeyColumn] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn hourly(n: usize) -> TimeIndex {
        TimeIndex::hourly(
            NaiveDate::from_ymd_opt(2015, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            n,
        )
    }

    #[test]
    fn test_new_validates_shape() {
        let result = TimeSeriesTable::new(
            hourly(2),
            vec!["a".into(), "b".into()],
            vec![1.0, 2.0, 3.0],
        );
        assert!(matches!(result, Err(TableError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_row_and_column_access() {
        let table = TimeSeriesTable::new(
            hourly(3),
            vec!["a".into(), "b".into()],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )
        .unwrap();

        assert_eq!(table.n_time(), 3);
        assert_eq!(table.n_keys(), 2);
        assert_eq!(table.row(1), &[3.0, 4.0]);
        assert_eq!(table.column(0), vec![1.0, 3.0, 5.0]);
        assert_eq!(table.column(1), vec![2.0, 4.0, 6.0]);
        assert_eq!(table.value(2, 0), 5.0);
        assert_eq!(table.key_position("b"), Some(1));
        assert_eq!(table.key_position("c"), None);
    }

    #[test]
    fn test_from_columns_matches_row_major() {
        let table = TimeSeriesTable::from_columns(
            hourly(3),
            vec![
                ("a".into(), vec![1.0, 3.0, 5.0]),
                ("b".into(), vec![2.0, 4.0, 6.0]),
            ],
        )
        .unwrap();

        assert_eq!(table.values(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_from_columns_validates_lengths() {
        let result = TimeSeriesTable::from_columns(
            hourly(3),
            vec![("a".into(), vec![1.0, 3.0, 5.0]), ("b".into(), vec![2.0])],
        );
        assert!(matches!(result, Err(TableError::ColumnLength { .. })));
    }

    #[test]
    fn test_key_table_validates_lengths() {
        let result = KeyTable::new(
            vec!["t1".into(), "t2".into()],
            vec![KeyColumn::new(
                "height",
                KeyColumnData::Float(vec![120.0]),
            )],
        );
        assert!(matches!(result, Err(TableError::ColumnLength { .. })));
    }
}
