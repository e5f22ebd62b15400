/*!
Direct runoff by the NRCS (formerly SCS) Curve Number method.

The US customary form works in inches: S = 1000/CN − 10, Ia = 0.2·S and
Q = (P − Ia)² / (P − Ia + S) for P > Ia, otherwise no runoff. The three `runoff_from_*`
functions are algebraically the same relation written from different known
quantities. A metric daily form in millimeters is provided for water-balance models.
*/
use serde::Deserialize;

use crate::error::{HydroError, Result, finite, non_negative};

/**
Looks up the NRCS Curve Number (CN) for average antecedent moisture condition (AMC II).

Values follow TR-55 table 2-2 for a handful of common urban and agricultural covers.

# Arguments
* `soil_group` - Hydrologic soil group ("A", "B", "C", "D").
* `land_use` - Land use description (e.g., "row crops good", "woods fair").

# Returns
The curve number, or `UnknownCurveNumber` if the combination is not tabulated.
*/
pub fn calculate_curve_number(soil_group: &str, land_use: &str) -> Result<f64> {
    match (
        soil_group.trim().to_uppercase().as_str(),
        land_use.trim().to_lowercase().as_str(),
    ) {
        // Impervious: paved parking lots, roofs, driveways
        ("A" | "B" | "C" | "D", "impervious") => Ok(98.0),

        // Open space (lawns, parks), good condition: grass cover > 75%
        ("A", "open space good") => Ok(39.0),
        ("B", "open space good") => Ok(61.0),
        ("C", "open space good") => Ok(74.0),
        ("D", "open space good") => Ok(80.0),

        // Open space, fair condition: grass cover 50% to 75%
        ("A", "open space fair") => Ok(49.0),
        ("B", "open space fair") => Ok(69.0),
        ("C", "open space fair") => Ok(79.0),
        ("D", "open space fair") => Ok(84.0),

        // Open space, poor condition: grass cover < 50%
        ("A", "open space poor") => Ok(68.0),
        ("B", "open space poor") => Ok(79.0),
        ("C", "open space poor") => Ok(86.0),
        ("D", "open space poor") => Ok(89.0),

        // Row crops, straight row, good condition
        ("A", "row crops good") => Ok(67.0),
        ("B", "row crops good") => Ok(78.0),
        ("C", "row crops good") => Ok(85.0),
        ("D", "row crops good") => Ok(89.0),

        // Row crops, straight row, poor condition
        ("A", "row crops poor") => Ok(72.0),
        ("B", "row crops poor") => Ok(81.0),
        ("C", "row crops poor") => Ok(88.0),
        ("D", "row crops poor") => Ok(91.0),

        // Pasture, good condition
        ("A", "pasture good") => Ok(39.0),
        ("B", "pasture good") => Ok(61.0),
        ("C", "pasture good") => Ok(74.0),
        ("D", "pasture good") => Ok(80.0),

        // Pasture, fair condition
        ("A", "pasture fair") => Ok(49.0),
        ("B", "pasture fair") => Ok(69.0),
        ("C", "pasture fair") => Ok(79.0),
        ("D", "pasture fair") => Ok(84.0),

        // Pasture, poor condition
        ("A", "pasture poor") => Ok(68.0),
        ("B", "pasture poor") => Ok(79.0),
        ("C", "pasture poor") => Ok(86.0),
        ("D", "pasture poor") => Ok(89.0),

        // Meadow, continuous grass, protected from grazing
        ("A", "meadow") => Ok(30.0),
        ("B", "meadow") => Ok(58.0),
        ("C", "meadow") => Ok(71.0),
        ("D", "meadow") => Ok(78.0),

        // Woods, good condition
        ("A", "woods good") => Ok(30.0),
        ("B", "woods good") => Ok(55.0),
        ("C", "woods good") => Ok(70.0),
        ("D", "woods good") => Ok(77.0),

        // Woods, fair condition
        ("A", "woods fair") => Ok(36.0),
        ("B", "woods fair") => Ok(60.0),
        ("C", "woods fair") => Ok(73.0),
        ("D", "woods fair") => Ok(79.0),

        // Woods, poor condition
        ("A", "woods poor") => Ok(45.0),
        ("B", "woods poor") => Ok(66.0),
        ("C", "woods poor") => Ok(77.0),
        ("D", "woods poor") => Ok(83.0),

        _ => Err(HydroError::UnknownCurveNumber {
            group: soil_group.to_string(),
            land_use: land_use.to_string(),
        }),
    }
}

/** Checks that `cn` lies in (0, 100]. */
pub fn validate_curve_number(cn: f64) -> Result<f64> {
    finite("curve number", cn)?;
    if cn > 0.0 && cn <= 100.0 {
        Ok(cn)
    } else {
        Err(HydroError::OutOfRange {
            name: "curve number",
            value: cn,
            reason: "must lie in (0, 100]",
        })
    }
}

/**
Potential maximum retention S [in] for curve number `cn`.

Unchecked: `cn` is assumed to lie in (0, 100]. See `try_potential_max_retention`.
*/
pub fn potential_max_retention(cn: f64) -> f64 {
    (1000.0 / cn) - 10.0
}

/** Potential maximum retention with `cn` validated first. */
pub fn try_potential_max_retention(cn: f64) -> Result<f64> {
    Ok(potential_max_retention(validate_curve_number(cn)?))
}

/** Initial abstraction Ia [in] from potential maximum retention `s`. */
pub fn initial_abstraction(s: f64) -> f64 {
    0.2 * s
}

/**
Runoff depth from initial abstraction, retention and precipitation [in].

The `runoff_from_*` functions do not check their inputs; the `try_` variants reject
non-finite or negative depths and curve numbers outside (0, 100].
*/
pub fn runoff_from_abstraction(ia: f64, s: f64, p: f64) -> f64 {
    if p <= ia {
        return 0.0;
    }
    (p - ia).powi(2) / (p - ia + s)
}

/** Runoff depth from retention and precipitation [in]. */
pub fn runoff_from_retention(s: f64, p: f64) -> f64 {
    if p <= 0.2 * s {
        return 0.0;
    }
    (p - 0.2 * s).powi(2) / (p + 0.8 * s)
}

/** Runoff depth from precipitation and curve number [in]. */
pub fn runoff_from_curve_number(p: f64, cn: f64) -> f64 {
    let excess = p - (200.0 / cn) + 2.0;
    if excess <= 0.0 {
        return 0.0;
    }
    excess.powi(2) / (p + (800.0 / cn) - 8.0)
}

pub fn try_runoff_from_abstraction(ia: f64, s: f64, p: f64) -> Result<f64> {
    non_negative("initial abstraction", ia)?;
    non_negative("potential maximum retention", s)?;
    non_negative("precipitation", p)?;
    Ok(runoff_from_abstraction(ia, s, p))
}

pub fn try_runoff_from_retention(s: f64, p: f64) -> Result<f64> {
    non_negative("potential maximum retention", s)?;
    non_negative("precipitation", p)?;
    Ok(runoff_from_retention(s, p))
}

pub fn try_runoff_from_curve_number(p: f64, cn: f64) -> Result<f64> {
    validate_curve_number(cn)?;
    non_negative("precipitation", p)?;
    Ok(runoff_from_curve_number(p, cn))
}

/**
Calculates the daily runoff depth using the NRCS Curve Number method.

This uses the metric version of the formula, with depths in millimeters.

# Arguments
- `water_application` - Total water input (e.g., precipitation + irrigation) in mm for the day.
- `cn` - Curve number (from `calculate_curve_number` or provided).

# Returns
The estimated runoff depth in mm.
*/
pub fn daily_runoff_mm(water_application: f64, cn: f64) -> f64 {
    if water_application <= 0.0 {
        return 0.0;
    }

    // Maximum potential retention (S) in mm
    let s = (25400.0 / cn) - 254.0;

    runoff_from_abstraction(initial_abstraction(s), s, water_application)
}

// One land cover class of a watershed
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LandCover {
    pub name: String,
    pub area: f64,         // [acres]
    pub curve_number: f64, // [-]
}

impl LandCover {
    pub fn new(name: impl Into<String>, area: f64, curve_number: f64) -> Result<Self> {
        let cover = LandCover {
            name: name.into(),
            area,
            curve_number,
        };
        cover.validate()?;
        Ok(cover)
    }

    pub fn validate(&self) -> Result<()> {
        non_negative("land cover area", self.area)?;
        validate_curve_number(self.curve_number)?;
        Ok(())
    }

    pub fn runoff_depth(&self, precipitation: f64) -> f64 {
        runoff_from_curve_number(precipitation, self.curve_number)
    }

    /** Runoff volume [acre-ft] for `precipitation` [in]. */
    pub fn runoff_volume(&self, precipitation: f64) -> f64 {
        self.runoff_depth(precipitation) / 12.0 * self.area
    }
}

/** Total runoff volume [acre-ft] of a watershed made of `covers`. */
pub fn composite_runoff_volume(covers: &[LandCover], precipitation: f64) -> Result<f64> {
    non_negative("precipitation", precipitation)?;
    let mut total = 0.0;
    for cover in covers {
        cover.validate()?;
        total += cover.runoff_volume(precipitation);
    }
    Ok(total)
}

/** Change from `before` to `after` as a percentage of `before`. */
pub fn percent_change(before: f64, after: f64) -> Result<f64> {
    if before == 0.0 {
        return Err(HydroError::OutOfRange {
            name: "baseline",
            value: before,
            reason: "percent change from zero is undefined",
        });
    }
    Ok(100.0 * (after - before) / before)
}
