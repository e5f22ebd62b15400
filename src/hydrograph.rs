/*!
Unit hydrographs and storm hydrograph prediction by superposition.

A unit hydrograph is derived from a gauged streamflow record by separating a constant
baseflow, scaling the remaining event flow so that it carries exactly 1 cm of runoff
over the watershed. A new storm is then routed by convolving its effective rainfall
pulses with those ordinates.
*/
use nalgebra::{DMatrix, DVector};
use serde::Deserialize;

use crate::error::{HydroError, Result, finite, non_negative, positive};

const SECONDS_PER_HOUR: f64 = 3600.0;
const M_TO_CM: f64 = 100.0;

/**
Returns the constant spacing of a series of sample times.

# Arguments
* `times` - Sample times in ascending order [hr].

# Returns
The time step, or an error if fewer than two samples are given or the spacing varies.
*/
pub fn uniform_step(times: &[f64]) -> Result<f64> {
    if times.len() < 2 {
        return Err(HydroError::Empty("time steps"));
    }
    let dt = positive("time step", times[1] - times[0])?;
    for pair in times.windows(2) {
        let step = pair[1] - pair[0];
        if (step - dt).abs() > 1e-9 * dt.max(1.0) {
            return Err(HydroError::OutOfRange {
                name: "time step",
                value: step,
                reason: "samples must be evenly spaced",
            });
        }
    }
    Ok(dt)
}

/** Streamflow above `baseflow`, never negative. */
pub fn event_flow(streamflow: &[f64], baseflow: f64) -> Vec<f64> {
    streamflow.iter().map(|q| (q - baseflow).max(0.0)).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitHydrograph {
    pub dt: f64,                 // Ordinate spacing [hr]
    pub ordinates: Vec<f64>,     // [m³/s per cm of runoff]
    pub event_flow: Vec<f64>,    // Direct runoff of the source record [m³/s]
    pub runoff_volume: f64,      // [m³]
    pub runoff_depth: f64,       // [cm]
}

/**
Derives a unit hydrograph from a gauged storm hydrograph.

# Arguments
* `streamflow` - Gauged flows at a constant spacing [m³/s].
* `baseflow` - Constant baseflow separated from the record [m³/s].
* `area` - Watershed area [m²].
* `dt` - Spacing of the record [hr].

# Returns
Ordinates of the unit hydrograph along with the event flow, runoff volume and
runoff depth of the source storm.
*/
pub fn derive_unit_hydrograph(
    streamflow: &[f64],
    baseflow: f64,
    area: f64,
    dt: f64,
) -> Result<UnitHydrograph> {
    if streamflow.is_empty() {
        return Err(HydroError::Empty("streamflow samples"));
    }
    for &q in streamflow {
        finite("streamflow", q)?;
    }
    non_negative("baseflow", baseflow)?;
    positive("watershed area", area)?;
    positive("time step", dt)?;

    let event_flow = event_flow(streamflow, baseflow);
    let runoff_volume = SECONDS_PER_HOUR * dt * event_flow.iter().sum::<f64>();
    let runoff_depth = M_TO_CM * runoff_volume / area;
    if runoff_depth <= 0.0 {
        return Err(HydroError::OutOfRange {
            name: "runoff depth",
            value: runoff_depth,
            reason: "record never rises above baseflow",
        });
    }

    let ordinates = event_flow.iter().map(|q| q / runoff_depth).collect();
    log::info!(
        "unit hydrograph: runoff volume {runoff_volume:.1} m³, depth {runoff_depth:.4} cm"
    );
    Ok(UnitHydrograph {
        dt,
        ordinates,
        event_flow,
        runoff_volume,
        runoff_depth,
    })
}

impl UnitHydrograph {
    pub fn times(&self) -> Vec<f64> {
        (0..self.ordinates.len()).map(|i| i as f64 * self.dt).collect()
    }

    /** Largest ordinate and the time it occurs. */
    pub fn peak(&self) -> (f64, f64) {
        self.ordinates
            .iter()
            .enumerate()
            .fold((0.0, f64::NEG_INFINITY), |(t, q), (i, &o)| {
                if o > q { (i as f64 * self.dt, o) } else { (t, q) }
            })
    }

    /**
    Predicts streamflow for a storm by discrete convolution.

    Each pulse of effective rainfall lasting `pulse_interval` hours is split evenly
    over the `pulse_interval / dt` ordinate steps it spans. The response is the
    product of the lower-triangular Toeplitz matrix of ordinates with the rainfall
    vector, plus baseflow.

    # Arguments
    * `excess` - Effective rainfall depth of each pulse [cm].
    * `pulse_interval` - Duration of each pulse [hr]; must be a whole multiple of `dt`.
    * `baseflow` - Constant baseflow added back to the direct runoff [m³/s].

    # Returns
    Streamflow [m³/s] at each ordinate step, starting at the beginning of the storm.
    */
    pub fn convolve(&self, excess: &[f64], pulse_interval: f64, baseflow: f64) -> Result<Vec<f64>> {
        if excess.is_empty() {
            return Err(HydroError::Empty("rainfall pulses"));
        }
        non_negative("baseflow", baseflow)?;
        let ratio = positive("pulse interval", pulse_interval)? / self.dt;
        let steps = ratio.round();
        if steps < 1.0 || (ratio - steps).abs() > 1e-9 {
            return Err(HydroError::OutOfRange {
                name: "pulse interval",
                value: pulse_interval,
                reason: "must be a whole multiple of the unit hydrograph step",
            });
        }
        let steps = steps as usize;

        let mut rainfall = Vec::with_capacity(excess.len() * steps);
        for &depth in excess {
            non_negative("effective rainfall", depth)?;
            rainfall.extend(std::iter::repeat_n(depth / steps as f64, steps));
        }

        let n = self.ordinates.len();
        let len = rainfall.len() + n - 1;
        let kernel = DMatrix::from_fn(len, rainfall.len(), |i, j| {
            if i >= j && i - j < n { self.ordinates[i - j] } else { 0.0 }
        });
        let direct = kernel * DVector::from_vec(rainfall);
        Ok(direct.iter().map(|q| q + baseflow).collect())
    }
}

// Rainfall rates of a storm at a fixed interval
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hyetograph {
    pub interval: f64,   // [hr]
    pub rates: Vec<f64>, // [cm/hr]
}

impl Hyetograph {
    pub fn new(interval: f64, rates: Vec<f64>) -> Result<Self> {
        let hyetograph = Hyetograph { interval, rates };
        hyetograph.validate()?;
        Ok(hyetograph)
    }

    pub fn validate(&self) -> Result<()> {
        positive("hyetograph interval", self.interval)?;
        if self.rates.is_empty() {
            return Err(HydroError::Empty("rainfall rates"));
        }
        for &rate in &self.rates {
            non_negative("rainfall rate", rate)?;
        }
        Ok(())
    }

    pub fn duration(&self) -> f64 {
        self.interval * self.rates.len() as f64
    }

    /** Rainfall depth of each interval [cm]. */
    pub fn depths(&self) -> Vec<f64> {
        self.rates.iter().map(|r| r * self.interval).collect()
    }

    pub fn total_depth(&self) -> f64 {
        self.depths().iter().sum()
    }

    /**
    Effective rainfall of each interval after an infiltration loss.

    The storm loses `infiltration_fraction` of its total depth, taken out at a
    constant rate over the whole storm. An interval lighter than its share of the loss
    produces no excess.
    */
    pub fn effective_rainfall(&self, infiltration_fraction: f64) -> Result<Vec<f64>> {
        non_negative("infiltration fraction", infiltration_fraction)?;
        if infiltration_fraction > 1.0 {
            return Err(HydroError::OutOfRange {
                name: "infiltration fraction",
                value: infiltration_fraction,
                reason: "cannot exceed 1",
            });
        }
        let loss = self.total_depth() * infiltration_fraction * self.interval / self.duration();
        Ok(self.depths().iter().map(|d| (d - loss).max(0.0)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const AREA: f64 = 324_000_000.0; // [m²]

    fn gauged() -> Vec<f64> {
        vec![50.0, 60.0, 80.0, 70.0, 55.0, 48.0]
    }

    #[test]
    fn event_flow_is_clamped_at_baseflow() {
        assert_eq!(event_flow(&gauged(), 50.0), vec![0.0, 10.0, 30.0, 20.0, 5.0, 0.0]);
    }

    #[test]
    fn unit_hydrograph_carries_one_centimeter() {
        let uh = derive_unit_hydrograph(&gauged(), 50.0, AREA, 1.0).unwrap();
        assert_relative_eq!(uh.runoff_volume, 234_000.0);
        assert_relative_eq!(uh.runoff_depth, 100.0 * 234_000.0 / AREA);

        let depth = M_TO_CM * SECONDS_PER_HOUR * uh.ordinates.iter().sum::<f64>() / AREA;
        assert_relative_eq!(depth, 1.0, epsilon = 1e-12);
        assert_eq!(uh.peak(), (2.0, uh.ordinates[2]));
        assert_eq!(uh.times(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn flat_record_has_no_unit_hydrograph() {
        assert!(derive_unit_hydrograph(&[50.0, 50.0], 50.0, AREA, 1.0).is_err());
        assert!(derive_unit_hydrograph(&[], 50.0, AREA, 1.0).is_err());
        assert!(derive_unit_hydrograph(&gauged(), 50.0, 0.0, 1.0).is_err());
    }

    fn triangle() -> UnitHydrograph {
        UnitHydrograph {
            dt: 1.0,
            ordinates: vec![0.0, 1.0, 2.0, 1.0, 0.0],
            event_flow: Vec::new(),
            runoff_volume: 0.0,
            runoff_depth: 1.0,
        }
    }

    #[test]
    fn single_unit_pulse_reproduces_ordinates() {
        let flows = triangle().convolve(&[1.0], 1.0, 0.0).unwrap();
        assert_eq!(flows, vec![0.0, 1.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn pulses_superpose() {
        let flows = triangle().convolve(&[2.0, 1.0], 1.0, 50.0).unwrap();
        assert_eq!(flows, vec![50.0, 52.0, 55.0, 54.0, 51.0, 50.0]);
    }

    #[test]
    fn long_pulse_is_spread_over_steps() {
        let flows = triangle().convolve(&[2.0], 2.0, 0.0).unwrap();
        assert_eq!(flows, vec![0.0, 1.0, 3.0, 3.0, 1.0, 0.0]);
        assert!(triangle().convolve(&[2.0], 1.5, 0.0).is_err());
        assert!(triangle().convolve(&[], 1.0, 0.0).is_err());
    }

    #[test]
    fn effective_rainfall_after_uniform_loss() {
        let storm = Hyetograph::new(2.0, vec![1.0, 3.0, 2.0, 0.2]).unwrap();
        assert_relative_eq!(storm.duration(), 8.0);
        assert_relative_eq!(storm.total_depth(), 12.4, epsilon = 1e-12);
        // loss per interval = 12.4 * 0.5 / 4 = 1.55 cm
        let excess = storm.effective_rainfall(0.5).unwrap();
        let expected = [0.45, 4.45, 2.45, 0.0];
        for (e, x) in excess.iter().zip(expected) {
            assert_relative_eq!(*e, x, epsilon = 1e-12);
        }
        assert!(storm.effective_rainfall(1.5).is_err());
    }

    #[test]
    fn uniform_spacing_is_required() {
        assert_eq!(uniform_step(&[0.0, 1.0, 2.0, 3.0]).unwrap(), 1.0);
        assert!(uniform_step(&[0.0, 1.0, 3.0]).is_err());
        assert!(uniform_step(&[0.0]).is_err());
    }
}
