//! Series preparation utilities.
//!
//! Small transforms applied to series tables before or after interchange:
//! stripping leap days so every simulated year has 8760 hourly rows, and a
//! linear transition ramp used to blend masks and availability curves.

use chrono::Datelike;

use crate::types::{TimeIndex, TimeSeriesTable};

/// Drop every February 29 row from a series table.
///
/// Key labels, the zone tag, and all other rows are preserved.
pub fn remove_leap_days(table: &TimeSeriesTable) -> TimeSeriesTable {
    let keep: Vec<usize> = table
        .time()
        .timestamps()
        .iter()
        .enumerate()
        .filter(|(_, t)| !(t.month() == 2 && t.day() == 29))
        .map(|(i, _)| i)
        .collect();

    let timestamps = keep
        .iter()
        .map(|&i| table.time().timestamps()[i])
        .collect();
    let time = match table.time().zone() {
        Some(zone) => TimeIndex::zoned(timestamps, zone),
        None => TimeIndex::naive(timestamps),
    };

    let mut values = Vec::with_capacity(keep.len() * table.n_keys());
    for &i in &keep {
        values.extend_from_slice(table.row(i));
    }

    TimeSeriesTable::from_parts(time, table.keys().to_vec(), values)
}

/// Linear transition ramp over a data array.
///
/// Values at or below `start` map to 0, values above `stop` map to 1, and
/// values in between map linearly. With `invert` the ramp runs 1 → 0.
pub fn linear_transition(x: &[f64], start: f64, stop: f64, invert: bool) -> Vec<f64> {
    x.iter()
        .map(|&v| {
            let t = if v <= start {
                0.0
            } else if v <= stop {
                (v - start) / (stop - start)
            } else {
                1.0
            };
            if invert { 1.0 - t } else { t }
        })
        .collect()
}
