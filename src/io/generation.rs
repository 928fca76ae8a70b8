//! Capacity-interpolated generation extraction.
//!
//! A simulation pipeline produces one netCDF file per region and technology,
//! holding the generation time series of that technology at a ladder of
//! pre-simulated installed-capacity tiers, plus the total cost at each tier.
//! This module answers "generation and cost at capacity X" for arbitrary X by
//! linear interpolation between the two tiers bracketing X.
//!
//! # File Format
//!
//! Required variables:
//! - `time`: time coordinate with a `units` attribute (`"<unit> since <epoch>"`)
//! - `total_capacity`: 1-D tier axis, strictly increasing, with a `unit` attribute
//! - `total_cost`: 1-D cost per tier, with a `unit` attribute
//! - `generation`: 2-D `(time, tier)` matrix, with `region`, `technology`,
//!   and `unit` attributes
//!
//! # Example
//!
//! ```rust,ignore
//! use res_rs::io::GenerationFile;
//!
//! let file = GenerationFile::open("region_onshore.nc")?;
//! let record = file.query(&[450.0, 900.0])?;
//! println!("{} {}: capex {:?} {}", record.region_name, record.variable,
//!          record.capex, record.capex_unit);
//! ```

use std::path::Path;

use thiserror::Error;

use crate::types::{TableError, TimeError, TimeIndex, TimeSeriesTable, TimeUnit};

/// Error type for generation-file queries.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Required variable absent from the file
    #[error("missing variable '{0}'")]
    MissingVariable(String),

    /// Required attribute absent from a variable
    #[error("missing attribute '{attribute}' on variable '{variable}'")]
    MissingAttribute {
        variable: String,
        attribute: String,
    },

    /// Stored variable has an unexpected shape
    #[error("variable '{variable}': {detail}")]
    BadShape { variable: String, detail: String },

    /// Tier axis is not strictly increasing
    #[error("capacity tiers are not strictly increasing at index {0}")]
    UnorderedTiers(usize),

    /// Too few tiers to bracket a non-exact capacity request
    #[error("at least two capacity tiers are required to interpolate, file holds {0}")]
    InsufficientTiers(usize),

    /// Time-axis decoding failure
    #[error("time axis error: {0}")]
    Time(#[from] TimeError),

    /// Result-table assembly failure
    #[error("result table error: {0}")]
    Table(#[from] TableError),

    /// NetCDF library error
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),
}

/// Generation and cost extracted at the requested capacity levels.
///
/// Capacities appear in caller order; `capex` and `extrapolated` run parallel
/// to them, and `generation` holds one column per requested capacity, labeled
/// with the capacity value.
#[derive(Clone, Debug)]
pub struct GenerationRecord {
    /// Requested capacity levels, in caller order
    pub capacity: Vec<f64>,
    /// Interpolated cost per requested capacity
    pub capex: Vec<f64>,
    /// Interpolated generation series, one column per requested capacity
    pub generation: TimeSeriesTable,
    /// True where the request fell outside the stored tier range and the
    /// linear formula extrapolated from the nearest tier pair
    pub extrapolated: Vec<bool>,
    /// Region identifier from the source file
    pub region_name: String,
    /// Technology identifier from the source file
    pub variable: String,
    /// Unit of the capacity tiers
    pub capacity_unit: String,
    /// Unit of the cost values
    pub capex_unit: String,
    /// Unit of the generation values
    pub generation_unit: String,
}

// ============================================================================
// GenerationFile
// ============================================================================

/// One region/technology source file, loaded for capacity queries.
///
/// The netCDF handle is opened, fully read, and released inside [`open`];
/// queries run against the in-memory copy.
///
/// [`open`]: GenerationFile::open
pub struct GenerationFile {
    time: TimeIndex,
    tiers: Vec<f64>,
    costs: Vec<f64>,
    /// Row-major (time, tier)
    generation: Vec<f64>,
    region: String,
    technology: String,
    capacity_unit: String,
    capex_unit: String,
    generation_unit: String,
}

impl GenerationFile {
    /// Open and load a generation source file.
    ///
    /// Validates the required schema and the tier-axis ordering up front; the
    /// file handle is released on every exit path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GenerationError> {
        let file = netcdf::open(path)?;

        let time_var = variable(&file, "time")?;
        let units = attr_string(&time_var, "time", "units")?;
        let unit = TimeUnit::parse(&units)?;
        let counts: Vec<u32> = time_var.get_values(..)?;
        let time = TimeIndex::naive(unit.decode(&counts)?);

        let tier_var = variable(&file, "total_capacity")?;
        let capacity_unit = attr_string(&tier_var, "total_capacity", "unit")?;
        let tiers: Vec<f64> = tier_var.get_values(..)?;

        if tiers.is_empty() {
            return Err(GenerationError::InsufficientTiers(0));
        }
        if let Some(i) = (1..tiers.len()).find(|&i| tiers[i] <= tiers[i - 1]) {
            return Err(GenerationError::UnorderedTiers(i));
        }

        let cost_var = variable(&file, "total_cost")?;
        let capex_unit = attr_string(&cost_var, "total_cost", "unit")?;
        let costs: Vec<f64> = cost_var.get_values(..)?;
        if costs.len() != tiers.len() {
            return Err(GenerationError::BadShape {
                variable: "total_cost".to_string(),
                detail: format!(
                    "{} costs do not match {} capacity tiers",
                    costs.len(),
                    tiers.len()
                ),
            });
        }

        let gen_var = variable(&file, "generation")?;
        let region = attr_string(&gen_var, "generation", "region")?;
        let technology = attr_string(&gen_var, "generation", "technology")?;
        let generation_unit = attr_string(&gen_var, "generation", "unit")?;

        let generation: Vec<f64> = gen_var.get_values(..)?;
        if generation.len() != time.len() * tiers.len() {
            return Err(GenerationError::BadShape {
                variable: "generation".to_string(),
                detail: format!(
                    "{} values do not match {} timestamps × {} tiers",
                    generation.len(),
                    time.len(),
                    tiers.len()
                ),
            });
        }

        Ok(Self {
            time,
            tiers,
            costs,
            generation,
            region,
            technology,
            capacity_unit,
            capex_unit,
            generation_unit,
        })
    }

    /// The stored capacity tiers.
    pub fn tiers(&self) -> &[f64] {
        &self.tiers
    }

    /// The decoded time axis.
    pub fn time(&self) -> &TimeIndex {
        &self.time
    }

    /// Region identifier.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Technology identifier.
    pub fn technology(&self) -> &str {
        &self.technology
    }

    /// Extract generation and cost at each requested capacity.
    ///
    /// For each capacity the nearest tier is located (ties on equal distance
    /// resolve to the lower index); an exact match returns that tier's
    /// generation column unchanged with its exact cost, otherwise the two
    /// bracketing tiers are blended linearly. Requests beyond the first or
    /// last tier extrapolate with the same formula from the nearest tier pair
    /// and are flagged in [`GenerationRecord::extrapolated`].
    pub fn query(&self, capacities: &[f64]) -> Result<GenerationRecord, GenerationError> {
        let mut capex = Vec::with_capacity(capacities.len());
        let mut extrapolated = Vec::with_capacity(capacities.len());
        let mut columns = Vec::with_capacity(capacities.len());

        for &cap in capacities {
            let (column, cost, outside) = self.at_capacity(cap)?;
            capex.push(cost);
            extrapolated.push(outside);
            columns.push((format_capacity(cap), column));
        }

        let generation = TimeSeriesTable::from_columns(self.time.clone(), columns)?;

        Ok(GenerationRecord {
            capacity: capacities.to_vec(),
            capex,
            generation,
            extrapolated,
            region_name: self.region.clone(),
            variable: self.technology.clone(),
            capacity_unit: self.capacity_unit.clone(),
            capex_unit: self.capex_unit.clone(),
            generation_unit: self.generation_unit.clone(),
        })
    }

    fn at_capacity(&self, cap: f64) -> Result<(Vec<f64>, f64, bool), GenerationError> {
        let s = nearest_tier(&self.tiers, cap);

        if self.tiers[s] == cap {
            return Ok((self.tier_column(s), self.costs[s], false));
        }

        if self.tiers.len() < 2 {
            return Err(GenerationError::InsufficientTiers(self.tiers.len()));
        }

        let (low, high, outside) = bracket(&self.tiers, s, cap);
        let factor = (cap - self.tiers[low]) / (self.tiers[high] - self.tiers[low]);

        let n_tiers = self.tiers.len();
        let column = (0..self.time.len())
            .map(|t| {
                let lo = self.generation[t * n_tiers + low];
                let hi = self.generation[t * n_tiers + high];
                lo * (1.0 - factor) + hi * factor
            })
            .collect();
        let cost = self.costs[low] * (1.0 - factor) + self.costs[high] * factor;

        Ok((column, cost, outside))
    }

    fn tier_column(&self, s: usize) -> Vec<f64> {
        let n_tiers = self.tiers.len();
        self.generation
            .iter()
            .skip(s)
            .step_by(n_tiers)
            .copied()
            .collect()
    }
}

/// Open a generation source file and query it in one call.
pub fn read_generation_file(
    path: impl AsRef<Path>,
    capacities: &[f64],
) -> Result<GenerationRecord, GenerationError> {
    GenerationFile::open(path)?.query(capacities)
}

/// Index of the tier closest to `cap` by absolute difference.
///
/// The strict comparison keeps the first (lowest) index when two tiers are
/// equidistant.
fn nearest_tier(tiers: &[f64], cap: f64) -> usize {
    let mut best = 0;
    let mut best_distance = (tiers[0] - cap).abs();
    for (i, &tier) in tiers.iter().enumerate().skip(1) {
        let distance = (tier - cap).abs();
        if distance < best_distance {
            best = i;
            best_distance = distance;
        }
    }
    best
}

/// Bracketing tier pair around `cap`, given the nearest tier `s`.
///
/// Requests beyond the first or last tier clamp to the nearest pair; the
/// returned flag marks that the pair extrapolates rather than brackets.
fn bracket(tiers: &[f64], s: usize, cap: f64) -> (usize, usize, bool) {
    let last = tiers.len() - 1;
    if tiers[s] > cap {
        if s == 0 {
            (0, 1, true)
        } else {
            (s - 1, s, false)
        }
    } else if s == last {
        (last - 1, last, true)
    } else {
        (s, s + 1, false)
    }
}

/// Column label for a requested capacity.
fn format_capacity(cap: f64) -> String {
    format!("{cap}")
}

// ============================================================================
// NetCDF access helpers
// ============================================================================

fn variable<'f>(
    file: &'f netcdf::File,
    name: &str,
) -> Result<netcdf::Variable<'f>, GenerationError> {
    file.variable(name)
        .ok_or_else(|| GenerationError::MissingVariable(name.to_string()))
}

fn attr_string(
    var: &netcdf::Variable,
    variable: &str,
    attribute: &str,
) -> Result<String, GenerationError> {
    let value = var
        .attribute_value(attribute)
        .ok_or_else(|| GenerationError::MissingAttribute {
            variable: variable.to_string(),
            attribute: attribute.to_string(),
        })??;
    match value {
        netcdf::AttributeValue::Str(s) => Ok(s),
        _ => Err(GenerationError::MissingAttribute {
            variable: variable.to_string(),
            attribute: attribute.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_tier_basic() {
        let tiers = [10.0, 20.0, 40.0];
        assert_eq!(nearest_tier(&tiers, 12.0), 0);
        assert_eq!(nearest_tier(&tiers, 19.0), 1);
        assert_eq!(nearest_tier(&tiers, 100.0), 2);
    }

    #[test]
    fn test_nearest_tier_tie_resolves_to_lower_index() {
        // 15 is equidistant from 10 and 20.
        assert_eq!(nearest_tier(&[10.0, 20.0], 15.0), 0);
        assert_eq!(nearest_tier(&[10.0, 20.0, 30.0], 25.0), 1);
    }

    #[test]
    fn test_bracket_interior() {
        let tiers = [10.0, 20.0, 40.0];
        // Nearest above the request
        assert_eq!(bracket(&tiers, 1, 18.0), (0, 1, false));
        // Nearest below the request
        assert_eq!(bracket(&tiers, 1, 24.0), (1, 2, false));
    }

    #[test]
    fn test_bracket_clamps_below_range() {
        let tiers = [10.0, 20.0, 40.0];
        assert_eq!(bracket(&tiers, 0, 5.0), (0, 1, true));
    }

    #[test]
    fn test_bracket_clamps_above_range() {
        let tiers = [10.0, 20.0, 40.0];
        assert_eq!(bracket(&tiers, 2, 55.0), (1, 2, true));
    }

    #[test]
    fn test_capacity_labels() {
        assert_eq!(format_capacity(15.0), "15");
        assert_eq!(format_capacity(12.5), "12.5");
    }
}
