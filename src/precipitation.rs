use serde::Deserialize;

use crate::error::{HydroError, Result, finite, non_negative, same_len};

/**
Area-weighted mean precipitation depth over a set of sub-areas.

# Arguments
* `regions` - `(area, depth)` pairs. Any consistent units work; the result is in the
  depth unit.

# Returns
The equivalent uniform depth Σ(area·depth) / Σ(area).

# Errors
`Empty` when no regions are given, `ZeroArea` when the areas sum to zero.
*/
pub fn area_weighted_depth(regions: &[(f64, f64)]) -> Result<f64> {
    if regions.is_empty() {
        return Err(HydroError::Empty("regions"));
    }

    let mut total_area = 0.0;
    let mut weighted = 0.0;
    for &(area, depth) in regions {
        non_negative("area", area)?;
        finite("depth", depth)?;
        total_area += area;
        weighted += area * depth;
    }

    if total_area == 0.0 {
        return Err(HydroError::ZeroArea);
    }
    Ok(weighted / total_area)
}

/**
Equivalent uniform depth by the Thiessen polygon method.

# Arguments
* `areas` - Area of each Thiessen polygon (e.g. km²).
* `depths` - Gauge reading inside each polygon (e.g. mm), parallel to `areas`.
*/
pub fn thiessen_eud(areas: &[f64], depths: &[f64]) -> Result<f64> {
    same_len(areas.len(), depths.len())?;
    let regions: Vec<(f64, f64)> = areas.iter().copied().zip(depths.iter().copied()).collect();
    area_weighted_depth(&regions)
}

// Region of a watershed bounded by one isohyet (the edge bands) or two
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IsohyetalBand {
    pub isohyets: Vec<f64>,
    pub area: f64,
}

impl IsohyetalBand {
    pub fn new(isohyets: Vec<f64>, area: f64) -> Self {
        IsohyetalBand { isohyets, area }
    }

    /** Mean of the bounding isohyets. */
    pub fn representative_depth(&self) -> Result<f64> {
        if self.isohyets.is_empty() {
            return Err(HydroError::Empty("isohyets"));
        }
        let sum: f64 = self.isohyets.iter().sum();
        Ok(sum / self.isohyets.len() as f64)
    }
}

/** Equivalent uniform depth by the isohyetal method. */
pub fn isohyetal_eud(bands: &[IsohyetalBand]) -> Result<f64> {
    let regions = bands
        .iter()
        .map(|band| Ok((band.area, band.representative_depth()?)))
        .collect::<Result<Vec<_>>>()?;
    area_weighted_depth(&regions)
}
