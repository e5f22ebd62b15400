/*!
Infiltration into soil by the Horton equation (empirical) and the Green-Ampt model
(a sharp wetting front advancing into uniformly moist soil).

Any consistent length and time units work; the examples use cm and hours.
*/
use serde::Deserialize;

use crate::error::{HydroError, Result, finite, non_negative, positive};
use crate::linspace;
use crate::root_find::RootFinder;

// Horton infiltration capacity parameters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawHorton")]
pub struct Horton {
    f0: f64, // Initial infiltration capacity [length/time]
    fc: f64, // Capacity once the soil is saturated [length/time]
    k: f64,  // Decay constant [1/time]
}

#[derive(Deserialize)]
struct RawHorton {
    f0: f64,
    fc: f64,
    k: f64,
}

impl TryFrom<RawHorton> for Horton {
    type Error = HydroError;

    fn try_from(raw: RawHorton) -> Result<Self> {
        Horton::new(raw.f0, raw.fc, raw.k)
    }
}

/** Outcome of a constant-intensity storm on a Horton soil. */
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HortonStorm {
    /** Time at which capacity falls to the rainfall rate, if it does during the storm. */
    pub critical_time: Option<f64>,
    pub rainfall: f64,
    pub infiltrated: f64,
    pub runoff: f64,
}

impl Horton {
    pub fn new(f0: f64, fc: f64, k: f64) -> Result<Self> {
        non_negative("fc", fc)?;
        finite("f0", f0)?;
        positive("k", k)?;
        if f0 < fc {
            return Err(HydroError::OutOfRange {
                name: "f0",
                value: f0,
                reason: "initial capacity cannot be below the final capacity",
            });
        }
        Ok(Horton { f0, fc, k })
    }

    pub fn f0(&self) -> f64 {
        self.f0
    }

    pub fn fc(&self) -> f64 {
        self.fc
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    /** Infiltration capacity at time `t`: f(t) = fc + (f0 − fc)·exp(−k·t). */
    pub fn capacity(&self, t: f64) -> f64 {
        self.fc + (self.f0 - self.fc) * (-self.k * t).exp()
    }

    /** Water infiltrated over [0, t] when infiltration proceeds at capacity. */
    pub fn cumulative(&self, t: f64) -> f64 {
        self.fc * t + (self.f0 - self.fc) * (1.0 - (-self.k * t).exp()) / self.k
    }

    /** Water infiltrated over [t1, t2] when infiltration proceeds at capacity. */
    pub fn cumulative_between(&self, t1: f64, t2: f64) -> f64 {
        let fraction = (self.f0 - self.fc) / -self.k;
        self.fc * t2 - self.fc * t1 + fraction * ((-self.k * t2).exp() - (-self.k * t1).exp())
    }

    /** Time at which capacity has decayed to `f`, for fc < f ≤ f0. */
    pub fn time_to_capacity(&self, f: f64) -> Result<f64> {
        finite("capacity", f)?;
        if f <= self.fc || f > self.f0 {
            return Err(HydroError::OutOfRange {
                name: "capacity",
                value: f,
                reason: "capacity is only reached for fc < f <= f0",
            });
        }
        Ok(((f - self.fc) / (self.f0 - self.fc)).ln() / -self.k)
    }

    /**
    Response to rain falling at a constant `rainfall_rate` for `duration`.

    While capacity exceeds the rainfall rate everything infiltrates. Past the
    critical time infiltration proceeds at capacity and the rest runs off.
    */
    pub fn storm_response(&self, rainfall_rate: f64, duration: f64) -> Result<HortonStorm> {
        non_negative("rainfall rate", rainfall_rate)?;
        non_negative("storm duration", duration)?;

        let rainfall = rainfall_rate * duration;
        let critical_time = if rainfall_rate <= self.fc {
            None
        } else if rainfall_rate >= self.f0 {
            Some(0.0)
        } else {
            Some(self.time_to_capacity(rainfall_rate)?)
        };

        match critical_time {
            Some(tc) if tc < duration => {
                let infiltrated = rainfall_rate * tc + self.cumulative_between(tc, duration);
                Ok(HortonStorm {
                    critical_time: Some(tc),
                    rainfall,
                    infiltrated,
                    runoff: rainfall - infiltrated,
                })
            }
            _ => Ok(HortonStorm {
                critical_time: None,
                rainfall,
                infiltrated: rainfall,
                runoff: 0.0,
            }),
        }
    }
}

/** Decay constant `k` for which capacity decays from `f0` to `f` in time `t`. */
pub fn horton_decay_constant(f0: f64, fc: f64, f: f64, t: f64) -> Result<f64> {
    positive("time", t)?;
    finite("f0", f0)?;
    non_negative("fc", fc)?;
    if !(f > fc && f < f0) {
        return Err(HydroError::OutOfRange {
            name: "capacity",
            value: f,
            reason: "decay is only observable for fc < f < f0",
        });
    }
    Ok(((f - fc) / (f0 - fc)).ln() / -t)
}

// Green-Ampt soil and initial moisture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreenAmpt {
    ks: f64,            // Saturated hydraulic conductivity [length/time]
    suction_head: f64,  // |ψ| at the wetting front [length]
    theta_sat: f64,     // Saturated water content [-]
    theta_init: f64,    // Initial water content [-]
}

/** Water infiltrated and time elapsed when ponding starts. */
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ponding {
    pub rainfall_rate: f64,
    pub infiltration: f64,
    pub time: f64,
}

/** Water balance of a constant-intensity storm on a Green-Ampt soil. */
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StormInfiltration {
    pub ponding: Option<Ponding>,
    pub rainfall: f64,
    pub infiltrated: f64,
    pub runoff: f64,
    pub final_rate: f64,
}

/** Time to ponding, tp = Fp / rainfall rate. */
pub fn ponding_time(fp: f64, rainfall_rate: f64) -> f64 {
    fp / rainfall_rate
}

impl GreenAmpt {
    /** `suction_head` may be given with either sign; its magnitude is used. */
    pub fn new(ks: f64, suction_head: f64, theta_sat: f64, theta_init: f64) -> Result<Self> {
        positive("ks", ks)?;
        finite("suction head", suction_head)?;
        non_negative("initial water content", theta_init)?;
        finite("saturated water content", theta_sat)?;
        if theta_sat > 1.0 {
            return Err(HydroError::OutOfRange {
                name: "saturated water content",
                value: theta_sat,
                reason: "cannot exceed 1",
            });
        }
        if theta_init >= theta_sat {
            return Err(HydroError::OutOfRange {
                name: "initial water content",
                value: theta_init,
                reason: "must be below the saturated water content",
            });
        }
        Ok(GreenAmpt {
            ks,
            suction_head: suction_head.abs(),
            theta_sat,
            theta_init,
        })
    }

    pub fn ks(&self) -> f64 {
        self.ks
    }

    pub fn moisture_deficit(&self) -> f64 {
        self.theta_sat - self.theta_init
    }

    // |ψ|·Δθ, appears in every Green-Ampt expression
    fn suction_deficit(&self) -> f64 {
        self.suction_head * self.moisture_deficit()
    }

    /** Fp = |ψ|·Ks·Δθ / (r − Ks); ponding needs r > Ks. */
    pub fn ponding_infiltration(&self, rainfall_rate: f64) -> Result<f64> {
        finite("rainfall rate", rainfall_rate)?;
        if rainfall_rate <= self.ks {
            return Err(HydroError::NoPonding {
                rainfall_rate,
                ks: self.ks,
            });
        }
        Ok(self.suction_deficit() * self.ks / (rainfall_rate - self.ks))
    }

    pub fn ponding(&self, rainfall_rate: f64) -> Result<Ponding> {
        let infiltration = self.ponding_infiltration(rainfall_rate)?;
        Ok(Ponding {
            rainfall_rate,
            infiltration,
            time: ponding_time(infiltration, rainfall_rate),
        })
    }

    /** Infiltration capacity once `f` has infiltrated: Ks + Ks·|ψ|Δθ / F. */
    pub fn infiltration_rate(&self, f: f64) -> Result<f64> {
        positive("cumulative infiltration", f)?;
        Ok(self.ks + self.ks * self.suction_deficit() / f)
    }

    /** Rate at time `t` with `f` infiltrated: rainfall before ponding, capacity after. */
    pub fn rate_at(&self, ponding: &Ponding, t: f64, f: f64) -> Result<f64> {
        if t <= ponding.time {
            Ok(ponding.rainfall_rate)
        } else {
            self.infiltration_rate(f)
        }
    }

    // Unguarded time relation, defined for any F > −|ψ|Δθ
    fn elapsed_time(&self, ponding: &Ponding, f: f64) -> f64 {
        let sd = self.suction_deficit();
        let log_term = ((ponding.infiltration + sd) / (f + sd)).ln();
        ponding.time + (f - ponding.infiltration + sd * log_term) / self.ks
    }

    /** Time needed for `f` to infiltrate; only defined past ponding (F > Fp). */
    pub fn time_to_infiltrate(&self, ponding: &Ponding, f: f64) -> Option<f64> {
        if f.is_finite() && f > ponding.infiltration {
            Some(self.elapsed_time(ponding, f))
        } else {
            log::warn!(
                "F = {f} does not exceed Fp = {}, time relation not applicable",
                ponding.infiltration
            );
            None
        }
    }

    /** time(F) − `end`; zero when `f` has infiltrated exactly by `end`. */
    pub fn storm_end_residual(&self, ponding: &Ponding, f: f64, end: f64) -> f64 {
        self.elapsed_time(ponding, f) - end
    }

    /**
    Cumulative infiltration at time `end` (after ponding), solved with `finder`.

    The root lies between Fp, reached at tp ≤ end, and the total rain r·end, which
    takes longer than `end` to infiltrate once capacity drops below r.
    */
    pub fn storm_end_infiltration<R: RootFinder>(
        &self,
        ponding: &Ponding,
        end: f64,
        finder: &R,
        guess: f64,
    ) -> Result<f64> {
        finite("storm end", end)?;
        if end <= ponding.time {
            return Err(HydroError::OutOfRange {
                name: "storm end",
                value: end,
                reason: "storm ends before ponding starts",
            });
        }
        let bracket = [ponding.infiltration, ponding.rainfall_rate * end];
        let root = finder.find_root(|f| self.storm_end_residual(ponding, f, end), guess, bracket)?;
        log::debug!("storm-end infiltration {} after {} iterations", root.x, root.iters);
        Ok(root.x)
    }

    /** Water balance of rain at `rainfall_rate` for `duration`. */
    pub fn storm_infiltration<R: RootFinder>(
        &self,
        rainfall_rate: f64,
        duration: f64,
        finder: &R,
    ) -> Result<StormInfiltration> {
        non_negative("rainfall rate", rainfall_rate)?;
        non_negative("storm duration", duration)?;
        let rainfall = rainfall_rate * duration;

        let no_ponding = StormInfiltration {
            ponding: None,
            rainfall,
            infiltrated: rainfall,
            runoff: 0.0,
            final_rate: rainfall_rate,
        };
        if rainfall_rate <= self.ks {
            return Ok(no_ponding);
        }
        let ponding = self.ponding(rainfall_rate)?;
        if ponding.time >= duration {
            return Ok(no_ponding);
        }

        let guess = 0.5 * (ponding.infiltration + rainfall);
        let infiltrated = self.storm_end_infiltration(&ponding, duration, finder, guess)?;
        Ok(StormInfiltration {
            ponding: Some(ponding),
            rainfall,
            infiltrated,
            runoff: rainfall - infiltrated,
            final_rate: self.infiltration_rate(infiltrated)?,
        })
    }

    /**
    (time, infiltration rate) samples for plotting a storm.

    `samples` points span [0, tp] at the rainfall rate, then `samples` more follow the
    post-ponding capacity from just past Fp up to `final_infiltration`.
    */
    pub fn rate_curve(
        &self,
        rainfall_rate: f64,
        final_infiltration: f64,
        samples: usize,
    ) -> Result<Vec<(f64, f64)>> {
        let ponding = self.ponding(rainfall_rate)?;
        finite("final infiltration", final_infiltration)?;
        if samples < 2 {
            return Err(HydroError::OutOfRange {
                name: "samples",
                value: samples as f64,
                reason: "need at least two samples per branch",
            });
        }

        let mut curve = Vec::with_capacity(2 * samples);
        for t in linspace(0.0, ponding.time, samples) {
            curve.push((t, rainfall_rate));
        }

        let start = ponding.infiltration + 1e-8;
        if final_infiltration > start {
            for f in linspace(start, final_infiltration, samples) {
                curve.push((self.elapsed_time(&ponding, f), self.infiltration_rate(f)?));
            }
        }
        Ok(curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::root_find::{Bisection, Newton};
    use approx::assert_relative_eq;

    fn horton() -> Horton {
        Horton::new(8.0, 1.0, 1.1).unwrap()
    }

    // Loam-like soil from a homework problem: Ks = 0.032 cm/hr, ψ = 20.8 cm
    fn homework_soil() -> GreenAmpt {
        GreenAmpt::new(0.032, 20.8, 0.5, 0.15).unwrap()
    }

    #[test]
    fn horton_capacity_relaxes_from_f0_to_fc() {
        let h = horton();
        assert_eq!(h.capacity(0.0), 8.0);
        assert_relative_eq!(h.capacity(100.0), 1.0, epsilon = 1e-12);
        assert!(h.capacity(1.0) < h.capacity(0.5));
    }

    #[test]
    fn horton_integral_is_additive() {
        let h = horton();
        for (t1, t2) in [(0.0, 0.0), (0.5, 2.0), (1.769, 4.0), (3.0, 3.0)] {
            assert_relative_eq!(
                h.cumulative(t1) + h.cumulative_between(t1, t2),
                h.cumulative(t2),
                epsilon = 1e-12
            );
        }
        assert_relative_eq!(h.cumulative_between(0.0, 2.5), h.cumulative(2.5), epsilon = 1e-12);
    }

    #[test]
    fn horton_time_and_decay_constant_are_inverse() {
        let h = horton();
        let t = h.time_to_capacity(2.0).unwrap();
        assert_relative_eq!(t, 1.7690092264, epsilon = 1e-9);
        assert_relative_eq!(h.capacity(t), 2.0, epsilon = 1e-12);
        assert_relative_eq!(
            horton_decay_constant(8.0, 1.0, 2.0, t).unwrap(),
            1.1,
            epsilon = 1e-12
        );
        assert!(h.time_to_capacity(1.0).is_err());
        assert!(h.time_to_capacity(9.0).is_err());
    }

    #[test]
    fn horton_storm_runoff() {
        let storm = horton().storm_response(2.0, 4.0).unwrap();
        assert_relative_eq!(storm.critical_time.unwrap(), 1.7690092264, epsilon = 1e-9);
        assert_relative_eq!(storm.runoff, 1.4000283912, epsilon = 1e-9);
        assert_relative_eq!(storm.infiltrated + storm.runoff, storm.rainfall, epsilon = 1e-12);
    }

    #[test]
    fn light_rain_on_horton_soil_all_infiltrates() {
        let storm = horton().storm_response(0.8, 4.0).unwrap();
        assert_eq!(storm.critical_time, None);
        assert_eq!(storm.runoff, 0.0);

        // Critical time after the storm ends
        let storm = horton().storm_response(2.0, 1.0).unwrap();
        assert_eq!(storm.critical_time, None);
        assert_relative_eq!(storm.infiltrated, 2.0);
    }

    #[test]
    fn invalid_horton_parameters() {
        assert!(Horton::new(1.0, 8.0, 1.1).is_err());
        assert!(Horton::new(8.0, 1.0, 0.0).is_err());
        assert!(Horton::new(8.0, -1.0, 1.0).is_err());
    }

    #[test]
    fn ponding_infiltration_and_time() {
        let soil = homework_soil();
        let ponding = soil.ponding(0.7).unwrap();
        assert_relative_eq!(ponding.infiltration, 0.348742515, epsilon = 1e-9);
        assert_relative_eq!(ponding.time, 0.498203593, epsilon = 1e-9);
    }

    #[test]
    fn rainfall_at_or_below_ks_never_ponds() {
        let soil = homework_soil();
        assert!(matches!(
            soil.ponding_infiltration(0.032),
            Err(HydroError::NoPonding { .. })
        ));
        assert!(soil.ponding(0.01).is_err());
    }

    #[test]
    fn rate_is_continuous_at_ponding() {
        let soil = GreenAmpt::new(0.1, -15.0, 0.5, 0.15).unwrap();
        let ponding = soil.ponding(0.6).unwrap();
        assert_relative_eq!(ponding.infiltration, 1.05, epsilon = 1e-12);
        assert_relative_eq!(
            soil.infiltration_rate(ponding.infiltration).unwrap(),
            0.6,
            epsilon = 1e-12
        );
        assert_eq!(soil.rate_at(&ponding, 1.0, 0.6).unwrap(), 0.6);
        assert!(soil.rate_at(&ponding, 2.5, 1.5).unwrap() < 0.6);
    }

    #[test]
    fn time_relation_needs_f_past_ponding() {
        let soil = homework_soil();
        let ponding = soil.ponding(0.7).unwrap();
        assert_eq!(soil.time_to_infiltrate(&ponding, ponding.infiltration), None);
        assert_eq!(soil.time_to_infiltrate(&ponding, 0.1), None);
        let t = soil.time_to_infiltrate(&ponding, 1.0).unwrap();
        assert!(t > ponding.time);
    }

    #[test]
    fn storm_end_infiltration_with_either_solver() {
        let soil = homework_soil();
        let ponding = soil.ponding(0.7).unwrap();
        let newton = soil
            .storm_end_infiltration(&ponding, 4.0, &Newton::default(), 1.4)
            .unwrap();
        let bisection = soil
            .storm_end_infiltration(&ponding, 4.0, &Bisection::default(), 1.4)
            .unwrap();
        assert_relative_eq!(newton, 1.4039454583, epsilon = 1e-8);
        assert_relative_eq!(bisection, newton, epsilon = 1e-8);
        assert_relative_eq!(
            soil.time_to_infiltrate(&ponding, newton).unwrap(),
            4.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn storm_water_balance() {
        let soil = GreenAmpt::new(0.1, 15.0, 0.5, 0.15).unwrap();
        let storm = soil.storm_infiltration(0.6, 3.0, &Newton::default()).unwrap();
        assert_relative_eq!(storm.rainfall, 1.8, epsilon = 1e-12);
        assert_relative_eq!(storm.infiltrated, 1.6608532725, epsilon = 1e-8);
        assert_relative_eq!(storm.runoff, 0.1391467275, epsilon = 1e-8);
        assert_relative_eq!(storm.final_rate, 0.4161025773, epsilon = 1e-8);
    }

    #[test]
    fn storm_ending_before_ponding_has_no_runoff() {
        let soil = GreenAmpt::new(0.1, 15.0, 0.5, 0.15).unwrap();
        let storm = soil.storm_infiltration(0.6, 1.5, &Newton::default()).unwrap();
        assert!(storm.ponding.is_none());
        assert_eq!(storm.runoff, 0.0);
        assert_eq!(storm.final_rate, 0.6);

        let drizzle = soil.storm_infiltration(0.05, 10.0, &Bisection::default()).unwrap();
        assert_eq!(drizzle.runoff, 0.0);
    }

    #[test]
    fn rate_curve_has_flat_then_decaying_branch() {
        let soil = homework_soil();
        let curve = soil.rate_curve(0.7, 1.4039454583, 50).unwrap();
        assert_eq!(curve.len(), 100);
        assert!(curve[..50].iter().all(|&(_, rate)| rate == 0.7));
        assert_relative_eq!(curve[49].0, 0.498203593, epsilon = 1e-9);
        assert!(curve[50..].windows(2).all(|w| w[1].0 > w[0].0 && w[1].1 < w[0].1));
        assert_relative_eq!(curve[99].0, 4.0, epsilon = 1e-6);
    }

    #[test]
    fn invalid_green_ampt_parameters() {
        assert!(GreenAmpt::new(0.0, 20.0, 0.5, 0.1).is_err());
        assert!(GreenAmpt::new(0.1, 20.0, 0.3, 0.3).is_err());
        assert!(GreenAmpt::new(0.1, 20.0, 1.2, 0.3).is_err());
        assert!(GreenAmpt::new(0.1, f64::NAN, 0.5, 0.1).is_err());
    }
}
