pub mod error;
pub mod evaporation;
pub mod hydrograph;
pub mod infiltration;
pub mod logging;
pub mod plot;
pub mod precipitation;
pub mod root_find;
pub mod runoff;
pub mod scenario;
pub mod soil_hydra;
pub mod table;
pub mod watershed;

pub use error::{HydroError, Result};
pub use evaporation::Weather;
pub use hydrograph::{Hyetograph, UnitHydrograph, derive_unit_hydrograph};
pub use infiltration::{GreenAmpt, Horton, Ponding};
pub use root_find::{Bisection, Newton, RootFinder, SolverConfig};
pub use runoff::{LandCover, calculate_curve_number};
pub use scenario::{Report, Scenario};
pub use soil_hydra::{SoilSample, SoilTextureTable};
pub use table::Table;

/**
`n` evenly spaced samples from `start` to `end`, both ends included.

The last sample is exactly `end`.
*/
pub(crate) fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 {
        (end - start) / (n - 1) as f64
    } else {
        0.0
    };
    (0..n).map(move |i| if i + 1 == n { end } else { start + step * i as f64 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn texture_storm_through_public_api() {
        let soil = SoilTextureTable::builtin()
            .unwrap()
            .resolve("sandy loam")
            .unwrap()
            .green_ampt(0.1)
            .unwrap();
        let newton = soil
            .storm_infiltration(5.0, 1.0, &Newton::default())
            .unwrap();
        let bisection = soil
            .storm_infiltration(5.0, 1.0, &Bisection::default())
            .unwrap();
        assert!(newton.ponding.is_some());
        assert_relative_eq!(newton.infiltrated, bisection.infiltrated, epsilon = 1e-9);
        assert_relative_eq!(newton.infiltrated + newton.runoff, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn linspace_includes_both_ends() {
        let samples: Vec<f64> = linspace(0.0, 0.3, 4).collect();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0], 0.0);
        assert_relative_eq!(samples[1], 0.1, epsilon = 1e-15);
        assert_eq!(samples[3], 0.3);
        assert_eq!(linspace(2.0, 5.0, 1).collect::<Vec<_>>(), vec![5.0]);
        assert_eq!(linspace(2.0, 5.0, 0).count(), 0);
    }
}
