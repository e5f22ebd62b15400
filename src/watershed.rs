use serde::Deserialize;

use crate::error::{HydroError, Result, finite, non_negative};

// Part of a watershed lying within one altitude range
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ElevationBand {
    pub lower_altitude: f64, // [m]
    pub area: f64,           // [km²]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HypsometricPoint {
    pub lower_altitude: f64,  // [m]
    pub cumulative_area: f64, // Area above the lower altitude [km²]
    pub percent_area: f64,    // [%]
}

/**
Builds the hypsometric curve of a watershed.

# Arguments
* `bands` - Elevation bands in any order.

# Returns
One point per band, highest band first, giving the area of the watershed lying above
the band's lower altitude and that area as a percentage of the whole watershed.
*/
pub fn hypsometric_curve(bands: &[ElevationBand]) -> Result<Vec<HypsometricPoint>> {
    if bands.is_empty() {
        return Err(HydroError::Empty("elevation bands"));
    }
    for band in bands {
        finite("lower altitude", band.lower_altitude)?;
        non_negative("band area", band.area)?;
    }
    let total: f64 = bands.iter().map(|b| b.area).sum();
    if total == 0.0 {
        return Err(HydroError::ZeroArea);
    }

    let mut sorted = bands.to_vec();
    sorted.sort_by(|a, b| b.lower_altitude.total_cmp(&a.lower_altitude));

    let mut cumulative_area = 0.0;
    Ok(sorted
        .iter()
        .map(|band| {
            cumulative_area += band.area;
            HypsometricPoint {
                lower_altitude: band.lower_altitude,
                cumulative_area,
                percent_area: 100.0 * cumulative_area / total,
            }
        })
        .collect())
}
