/*!
TOML scenarios: the inputs of one set of hydrology calculations.

Every section is optional. `Scenario::run` evaluates the sections present, logs each
result, and writes CSV tables and SVG charts into an output directory.

```toml
name = "Week 7"

[green_ampt]
texture = "silt loam"
theta_init = 0.2
rainfall_rate = 3.0
duration = 1.0
solver = "bisection"
```
*/
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{HydroError, Result, same_len};
use crate::evaporation::Weather;
use crate::hydrograph::{Hyetograph, derive_unit_hydrograph, uniform_step};
use crate::infiltration::{GreenAmpt, Horton, StormInfiltration};
use crate::linspace;
use crate::plot::{Chart, Marker, Series};
use crate::precipitation::{IsohyetalBand, isohyetal_eud, thiessen_eud};
use crate::root_find::{Bisection, Newton, SolverConfig};
use crate::runoff::{
    LandCover, composite_runoff_volume, initial_abstraction, percent_change,
    potential_max_retention, runoff_from_curve_number,
};
use crate::soil_hydra::{SoilSample, SoilTextureTable};
use crate::table::{CsvConfig, Table};
use crate::watershed::{ElevationBand, hypsometric_curve};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default = "default_name")]
    pub name: String,
    pub precipitation: Option<PrecipitationSection>,
    pub evaporation: Option<Weather>,
    pub soil_sample: Option<SoilSampleSection>,
    pub horton: Option<HortonSection>,
    pub green_ampt: Option<GreenAmptSection>,
    pub curve_number: Option<CurveNumberSection>,
    pub unit_hydrograph: Option<UnitHydrographSection>,
    pub hypsometric: Option<HypsometricSection>,

    // Directory that relative table paths are resolved against
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_name() -> String {
    "scenario".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThiessenInput {
    pub areas: Vec<f64>,
    pub depths: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrecipitationSection {
    pub thiessen: Option<ThiessenInput>,
    #[serde(default)]
    pub isohyetal: Vec<IsohyetalBand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SoilSampleSection {
    #[serde(flatten)]
    pub sample: SoilSample,
    pub wilting_point: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StormInput {
    pub rainfall_rate: f64,          // [cm/hr]
    pub duration: f64,               // [hr]
    pub watershed_area: Option<f64>, // [m²]
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HortonSection {
    #[serde(flatten)]
    pub model: Horton,
    pub storm: Option<StormInput>,
    #[serde(default = "default_plot_hours")]
    pub plot_hours: f64,
}

fn default_plot_hours() -> f64 {
    5.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    #[default]
    Newton,
    Bisection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GreenAmptSection {
    pub texture: Option<String>,
    pub ks: Option<f64>,           // [cm/hr]
    pub suction_head: Option<f64>, // [cm]
    pub theta_sat: Option<f64>,
    pub theta_init: f64,
    pub rainfall_rate: f64, // [cm/hr]
    pub duration: f64,      // [hr]
    #[serde(default)]
    pub solver: SolverKind,
    #[serde(default)]
    pub solver_config: SolverConfig,
    #[serde(default = "default_samples")]
    pub samples: usize,
}

fn default_samples() -> usize {
    50
}

impl GreenAmptSection {
    /** Explicit soil parameters win over a texture class name. */
    pub fn model(&self) -> Result<GreenAmpt> {
        match (self.ks, self.suction_head, self.theta_sat) {
            (Some(ks), Some(suction_head), Some(theta_sat)) => {
                GreenAmpt::new(ks, suction_head, theta_sat, self.theta_init)
            }
            (None, None, None) => {
                let texture = self.texture.as_deref().unwrap_or_default();
                SoilTextureTable::builtin()?
                    .resolve(texture)?
                    .green_ampt(self.theta_init)
            }
            _ => Err(HydroError::Scenario {
                section: "green_ampt",
                reason: "give all of ks, suction_head and theta_sat, or a texture",
            }),
        }
    }

    pub fn storm(&self) -> Result<StormInfiltration> {
        self.solver_config.validate()?;
        let model = self.model()?;
        match self.solver {
            SolverKind::Newton => {
                let finder = Newton::new(self.solver_config);
                model.storm_infiltration(self.rainfall_rate, self.duration, &finder)
            }
            SolverKind::Bisection => {
                let finder = Bisection::new(self.solver_config);
                model.storm_infiltration(self.rainfall_rate, self.duration, &finder)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurveNumberSection {
    pub precipitation: f64, // [in]
    pub before: Vec<LandCover>,
    #[serde(default)]
    pub after: Vec<LandCover>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableSource {
    pub path: PathBuf,
    #[serde(default)]
    pub csv: CsvConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewStorm {
    #[serde(flatten)]
    pub hyetograph: Hyetograph,
    pub infiltration_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnitHydrographSection {
    pub table: Option<TableSource>,
    #[serde(default = "default_time_column")]
    pub time_column: String,
    #[serde(default = "default_flow_column")]
    pub flow_column: String,
    #[serde(default)]
    pub times: Vec<f64>,      // [hr]
    #[serde(default)]
    pub streamflow: Vec<f64>, // [m³/s]
    pub baseflow: f64,        // [m³/s]
    pub area: f64,            // [m²]
    pub storm: Option<NewStorm>,
}

fn default_time_column() -> String {
    "Time (hrs)".to_string()
}

fn default_flow_column() -> String {
    "Streamflow (m3/sec)".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HypsometricSection {
    pub table: Option<TableSource>,
    #[serde(default)]
    pub bands: Vec<ElevationBand>,
}

/** Named results of a scenario run and the files it wrote. */
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub values: Vec<(String, f64)>,
    pub files: Vec<PathBuf>,
}

impl Report {
    fn record(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        log::info!("{name} = {value:.6}");
        self.values.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.iter().find(|(n, _)| n == name).map(|&(_, v)| v)
    }
}

// Destination for the tables and charts of one run
struct Output<'a> {
    dir: &'a Path,
    report: Report,
}

impl Output<'_> {
    fn table(&mut self, file: &str, table: &Table) -> Result<()> {
        let path = self.dir.join(file);
        table.write(&path)?;
        self.report.files.push(path);
        Ok(())
    }

    fn chart(&mut self, file: &str, chart: &Chart) -> Result<()> {
        let path = self.dir.join(file);
        chart.render_svg(&path)?;
        self.report.files.push(path);
        Ok(())
    }
}

impl Scenario {
    pub fn from_toml_str(toml_str: &str, base_dir: impl Into<PathBuf>) -> std::result::Result<Self, toml::de::Error> {
        let mut scenario: Scenario = toml::from_str(toml_str)?;
        scenario.base_dir = base_dir.into();
        Ok(scenario)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let toml_str = fs::read_to_string(path).map_err(|source| HydroError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_toml_str(&toml_str, base_dir).map_err(|source| HydroError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    fn read_table(&self, source: &TableSource) -> Result<Table> {
        Table::read(self.base_dir.join(&source.path), &source.csv)
    }

    /** Evaluates every section and writes its tables and charts into `output_dir`. */
    pub fn run(&self, output_dir: impl AsRef<Path>) -> Result<Report> {
        let dir = output_dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| HydroError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        log::info!("running scenario '{}'", self.name);

        let mut out = Output {
            dir,
            report: Report::default(),
        };
        if let Some(section) = &self.precipitation {
            run_precipitation(section, &mut out)?;
        }
        if let Some(weather) = &self.evaporation {
            run_evaporation(weather, &mut out)?;
        }
        if let Some(section) = &self.soil_sample {
            run_soil_sample(section, &mut out)?;
        }
        if let Some(section) = &self.horton {
            run_horton(section, &mut out)?;
        }
        if let Some(section) = &self.green_ampt {
            run_green_ampt(section, &mut out)?;
        }
        if let Some(section) = &self.curve_number {
            run_curve_number(section, &mut out)?;
        }
        if let Some(section) = &self.unit_hydrograph {
            self.run_unit_hydrograph(section, &mut out)?;
        }
        if let Some(section) = &self.hypsometric {
            self.run_hypsometric(section, &mut out)?;
        }
        Ok(out.report)
    }

    fn run_unit_hydrograph(&self, section: &UnitHydrographSection, out: &mut Output) -> Result<()> {
        let (times, streamflow) = match &section.table {
            Some(source) => {
                let table = self.read_table(source)?;
                (
                    table.column(&section.time_column)?.to_vec(),
                    table.column(&section.flow_column)?.to_vec(),
                )
            }
            None => (section.times.clone(), section.streamflow.clone()),
        };
        same_len(times.len(), streamflow.len())?;
        let dt = uniform_step(&times)?;

        let uh = derive_unit_hydrograph(&streamflow, section.baseflow, section.area, dt)?;
        out.report.record("unit hydrograph runoff volume [m3]", uh.runoff_volume);
        out.report.record("unit hydrograph runoff depth [cm]", uh.runoff_depth);
        let (peak_time, peak) = uh.peak();
        out.report.record("unit hydrograph peak [m3/s per cm]", peak);
        out.report.record("unit hydrograph time to peak [hr]", peak_time);

        let table = Table::new()
            .with_column(section.time_column.as_str(), times.clone())?
            .with_column(section.flow_column.as_str(), streamflow)?
            .with_column("Event flow (m3/sec)", uh.event_flow.clone())?
            .with_column("Unit hydrograph (m3/sec for 1cm of runoff)", uh.ordinates.clone())?;
        out.table("unit_hydrograph.csv", &table)?;
        out.chart(
            "unit_hydrograph.svg",
            &Chart::new("Unit hydrograph", "Time (hrs)", "Unit hydrograph (m3/s per cm of runoff)")
                .with_series(Series::from_columns(
                    "unit hydrograph",
                    &times,
                    &uh.ordinates,
                    Marker::LineAndScatter,
                )),
        )?;

        let Some(storm) = &section.storm else {
            return Ok(());
        };
        storm.hyetograph.validate()?;
        let excess = storm
            .hyetograph
            .effective_rainfall(storm.infiltration_fraction)?;
        out.report
            .record("new storm rainfall [cm]", storm.hyetograph.total_depth());
        out.report
            .record("new storm effective rainfall [cm]", excess.iter().sum());

        let interval = storm.hyetograph.interval;
        let starts: Vec<f64> = (0..excess.len()).map(|i| i as f64 * interval).collect();
        let hyetograph = Table::new()
            .with_column("Time (hrs)", starts)?
            .with_column("Rainfall rate (cm/hr)", storm.hyetograph.rates.clone())?
            .with_column("Total rainfall (cm)", storm.hyetograph.depths())?
            .with_column("Effective rainfall (cm)", excess.clone())?;
        out.table("new_storm_hyetograph.csv", &hyetograph)?;

        let flows = uh.convolve(&excess, interval, section.baseflow)?;
        let flow_times: Vec<f64> = (0..flows.len()).map(|i| times[0] + i as f64 * dt).collect();
        let peak = flows.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        out.report.record("new storm peak streamflow [m3/s]", peak);

        let modeled = Table::new()
            .with_column("Time (hrs)", flow_times.clone())?
            .with_column("Streamflow (m3/s)", flows.clone())?;
        out.table("modeled_streamflow.csv", &modeled)?;
        out.chart(
            "modeled_streamflow.svg",
            &Chart::new("Modeled streamflow", "Time (hrs)", "Streamflow (m3/s)").with_series(
                Series::from_columns("streamflow", &flow_times, &flows, Marker::LineAndScatter),
            ),
        )
    }

    fn run_hypsometric(&self, section: &HypsometricSection, out: &mut Output) -> Result<()> {
        let bands: Vec<ElevationBand> = match &section.table {
            Some(source) => {
                let table = self.read_table(source)?;
                let altitudes = table.column("Lower altitude (m)")?;
                let areas = table.column("Area within altitude range (km2)")?;
                altitudes
                    .iter()
                    .zip(areas)
                    .map(|(&lower_altitude, &area)| ElevationBand {
                        lower_altitude,
                        area,
                    })
                    .collect()
            }
            None => section.bands.clone(),
        };

        let curve = hypsometric_curve(&bands)?;
        let altitudes: Vec<f64> = curve.iter().map(|p| p.lower_altitude).collect();
        let areas: Vec<f64> = curve.iter().map(|p| p.cumulative_area).collect();
        let percents: Vec<f64> = curve.iter().map(|p| p.percent_area).collect();
        if let Some(total) = areas.last() {
            out.report.record("watershed area [km2]", *total);
        }

        let table = Table::new()
            .with_column("Lower altitude (m)", altitudes.clone())?
            .with_column("Cumulative area above lower altitude (km2)", areas.clone())?
            .with_column(
                "Proportion of cumulative area above lower altitude (%)",
                percents.clone(),
            )?;
        out.table("hypsometric_curve.csv", &table)?;
        out.chart(
            "hypsometric_area.svg",
            &Chart::new(
                "Hypsometric curve: cumulative area above a given altitude",
                "Area of watershed above a given altitude (km2)",
                "Altitude (m)",
            )
            .with_series(Series::from_columns("area", &areas, &altitudes, Marker::LineAndScatter)),
        )?;
        out.chart(
            "hypsometric_percent.svg",
            &Chart::new(
                "Hypsometric curve: proportion of area above a given altitude",
                "Proportion of watershed area above a given altitude (%)",
                "Altitude (m)",
            )
            .with_series(Series::from_columns(
                "proportion",
                &percents,
                &altitudes,
                Marker::LineAndScatter,
            )),
        )
    }
}

fn run_precipitation(section: &PrecipitationSection, out: &mut Output) -> Result<()> {
    if let Some(thiessen) = &section.thiessen {
        let eud = thiessen_eud(&thiessen.areas, &thiessen.depths)?;
        out.report.record("Thiessen EUD", eud);
    }
    if !section.isohyetal.is_empty() {
        let eud = isohyetal_eud(&section.isohyetal)?;
        out.report.record("isohyetal EUD", eud);
    }
    Ok(())
}

fn run_evaporation(weather: &Weather, out: &mut Output) -> Result<()> {
    weather.validate()?;
    out.report
        .record("saturation vapor pressure [Pa]", weather.saturation_vapor_pressure());
    out.report
        .record("actual vapor pressure [Pa]", weather.actual_vapor_pressure());
    out.report.record("relative humidity [%]", weather.relative_humidity());
    out.report.record("Meyer evaporation [cm/day]", weather.meyer());
    out.report.record("Dunne evaporation [cm/day]", weather.dunne());
    Ok(())
}

fn run_soil_sample(section: &SoilSampleSection, out: &mut Output) -> Result<()> {
    let sample = &section.sample;
    sample.validate()?;
    out.report
        .record("gravimetric water content", sample.gravimetric_water_content());
    out.report
        .record("volumetric water content", sample.volumetric_water_content());
    out.report.record("porosity", sample.porosity());
    out.report.record("field capacity", sample.field_capacity());
    out.report.record("bulk density [g/cm3]", sample.bulk_density());
    out.report
        .record("degree of saturation", sample.degree_of_saturation());
    if let Some(wilting_point) = section.wilting_point {
        out.report
            .record("available water", sample.available_water(wilting_point));
    }
    Ok(())
}

fn run_horton(section: &HortonSection, out: &mut Output) -> Result<()> {
    let model = &section.model;
    let times: Vec<f64> = linspace(0.0, section.plot_hours, 50).collect();
    let capacity: Vec<f64> = times.iter().map(|&t| model.capacity(t)).collect();
    let cumulative: Vec<f64> = times.iter().map(|&t| model.cumulative(t)).collect();
    out.report
        .record("Horton cumulative infiltration [cm]", model.cumulative(section.plot_hours));

    let table = Table::new()
        .with_column("Time (hr)", times.clone())?
        .with_column("Infiltration capacity (cm/hr)", capacity.clone())?
        .with_column("Cumulative infiltration (cm)", cumulative)?;
    out.table("horton.csv", &table)?;
    out.chart(
        "horton.svg",
        &Chart::new("Horton infiltration capacity", "Time (hr)", "Infiltration capacity (cm/hr)")
            .with_series(Series::from_columns("capacity", &times, &capacity, Marker::Line)),
    )?;

    if let Some(storm) = section.storm {
        let response = model.storm_response(storm.rainfall_rate, storm.duration)?;
        if let Some(tc) = response.critical_time {
            out.report.record("Horton critical time [hr]", tc);
        }
        out.report.record("Horton infiltrated depth [cm]", response.infiltrated);
        out.report.record("Horton runoff depth [cm]", response.runoff);
        if let Some(area) = storm.watershed_area {
            out.report
                .record("Horton runoff volume [m3]", area * response.runoff / 100.0);
        }
    }
    Ok(())
}

fn run_green_ampt(section: &GreenAmptSection, out: &mut Output) -> Result<()> {
    let storm = section.storm()?;
    out.report.record("Green-Ampt rainfall [cm]", storm.rainfall);
    out.report.record("Green-Ampt infiltrated depth [cm]", storm.infiltrated);
    out.report.record("Green-Ampt runoff depth [cm]", storm.runoff);
    out.report.record("Green-Ampt final rate [cm/hr]", storm.final_rate);

    let Some(ponding) = storm.ponding else {
        log::info!("no ponding during the storm, rainfall infiltrates completely");
        return Ok(());
    };
    out.report.record("ponding infiltration Fp [cm]", ponding.infiltration);
    out.report.record("ponding time tp [hr]", ponding.time);

    let curve = section.model()?.rate_curve(
        section.rainfall_rate,
        storm.infiltrated,
        section.samples,
    )?;
    let (times, rates): (Vec<f64>, Vec<f64>) = curve.into_iter().unzip();
    let table = Table::new()
        .with_column("Time (hr)", times.clone())?
        .with_column("Infiltration rate (cm/hr)", rates.clone())?;
    out.table("green_ampt.csv", &table)?;
    out.chart(
        "green_ampt.svg",
        &Chart::new("Green-Ampt infiltration rate", "Time (hr)", "Infiltration rate (cm/hr)")
            .with_series(Series::from_columns("infiltration rate", &times, &rates, Marker::Line)),
    )
}

fn run_curve_number(section: &CurveNumberSection, out: &mut Output) -> Result<()> {
    let p = section.precipitation;
    for cover in section.before.iter().chain(&section.after) {
        cover.validate()?;
        let s = potential_max_retention(cover.curve_number);
        out.report.record(format!("{} S [in]", cover.name), s);
        out.report.record(format!("{} Ia [in]", cover.name), initial_abstraction(s));
        out.report.record(format!("{} Q [in]", cover.name), cover.runoff_depth(p));
    }

    let before = composite_runoff_volume(&section.before, p)?;
    out.report.record("runoff volume before [acre-ft]", before);
    if !section.after.is_empty() {
        let after = composite_runoff_volume(&section.after, p)?;
        out.report.record("runoff volume after [acre-ft]", after);
        out.report
            .record("runoff volume change [%]", percent_change(before, after)?);
    }

    let mut curve_numbers: Vec<f64> = section
        .before
        .iter()
        .chain(&section.after)
        .map(|c| c.curve_number)
        .collect();
    curve_numbers.sort_by(f64::total_cmp);
    curve_numbers.dedup();

    let depths: Vec<f64> = linspace(0.0, 2.0 * p, 50).collect();
    let mut table = Table::new().with_column("Precipitation (in)", depths.clone())?;
    let mut chart = Chart::new("SCS curve number runoff", "Precipitation (in)", "Runoff (in)");
    for cn in curve_numbers {
        let runoff: Vec<f64> = depths.iter().map(|&d| runoff_from_curve_number(d, cn)).collect();
        chart = chart.with_series(Series::from_columns(format!("CN {cn}"), &depths, &runoff, Marker::Line));
        table.push_column(format!("Runoff CN {cn} (in)"), runoff)?;
    }
    out.table("curve_number.csv", &table)?;
    out.chart("curve_number.svg", &chart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn output_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("watershed_hydro_{tag}_{}", std::process::id()))
    }

    #[test]
    fn scalar_sections() {
        let scenario = Scenario::from_toml_str(
            r#"
            name = "homework 2"

            [precipitation]
            thiessen = { areas = [10.0, 30.0], depths = [2.0, 4.0] }
            isohyetal = [
                { isohyets = [10.0], area = 5.0 },
                { isohyets = [10.0, 20.0], area = 5.0 },
            ]

            [evaporation]
            air_temperature = 21.0
            dew_point = 11.0
            wind_speed_mph = 2.1

            [soil_sample]
            volume = 100.0
            initial_mass = 176.0
            dry_mass = 164.0
            saturated_mass = 218.0
            field_capacity_mass = 188.0
            wilting_point = 0.04

            [horton]
            f0 = 8.0
            fc = 1.0
            k = 1.1
            storm = { rainfall_rate = 2.0, duration = 4.0, watershed_area = 300000.0 }
            "#,
            ".",
        )
        .unwrap();
        let dir = output_dir("scalar");
        let report = scenario.run(&dir).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_relative_eq!(report.get("Thiessen EUD").unwrap(), 3.5);
        assert_relative_eq!(report.get("isohyetal EUD").unwrap(), 12.5);
        assert_relative_eq!(report.get("Meyer evaporation [cm/day]").unwrap(), 0.383837, epsilon = 1e-6);
        assert_relative_eq!(report.get("Dunne evaporation [cm/day]").unwrap(), 0.161102, epsilon = 1e-6);
        assert_relative_eq!(report.get("porosity").unwrap(), 0.54);
        assert_relative_eq!(report.get("available water").unwrap(), 0.20, epsilon = 1e-12);
        assert_relative_eq!(report.get("Horton critical time [hr]").unwrap(), 1.7690092264, epsilon = 1e-9);
        assert_relative_eq!(
            report.get("Horton runoff volume [m3]").unwrap(),
            3000.0 * 1.4000283912,
            epsilon = 1e-5
        );
        assert_eq!(report.files.len(), 2);
    }

    #[test]
    fn green_ampt_with_either_solver() {
        for solver in ["newton", "bisection"] {
            let scenario = Scenario::from_toml_str(
                &format!(
                    r#"
                    [green_ampt]
                    ks = 0.1
                    suction_head = 15.0
                    theta_sat = 0.5
                    theta_init = 0.15
                    rainfall_rate = 0.6
                    duration = 3.0
                    solver = "{solver}"
                    "#
                ),
                ".",
            )
            .unwrap();
            let dir = output_dir(&format!("green_ampt_{solver}"));
            let report = scenario.run(&dir).unwrap();
            fs::remove_dir_all(&dir).unwrap();

            assert_relative_eq!(report.get("ponding infiltration Fp [cm]").unwrap(), 1.05, epsilon = 1e-12);
            assert_relative_eq!(
                report.get("Green-Ampt infiltrated depth [cm]").unwrap(),
                1.6608532725,
                epsilon = 1e-8
            );
            assert_eq!(report.files.len(), 2);
        }
    }

    #[test]
    fn partial_green_ampt_parameters_are_rejected() {
        let section = GreenAmptSection {
            texture: None,
            ks: Some(0.1),
            suction_head: None,
            theta_sat: None,
            theta_init: 0.15,
            rainfall_rate: 0.6,
            duration: 3.0,
            solver: SolverKind::Newton,
            solver_config: SolverConfig::default(),
            samples: 50,
        };
        assert!(matches!(section.model(), Err(HydroError::Scenario { .. })));

        let by_texture = GreenAmptSection {
            ks: None,
            texture: Some("clay".to_string()),
            ..section
        };
        assert_relative_eq!(by_texture.model().unwrap().ks(), 0.03);
    }

    #[test]
    fn development_scenario() {
        let scenario = Scenario::from_toml_str(
            r#"
            [curve_number]
            precipitation = 4.8
            before = [{ name = "forest", area = 54.0, curve_number = 55.0 }]
            after = [
                { name = "forest", area = 9.0, curve_number = 55.0 },
                { name = "developed", area = 36.0, curve_number = 98.0 },
                { name = "landscaping", area = 9.0, curve_number = 70.0 },
            ]
            "#,
            ".",
        )
        .unwrap();
        let dir = output_dir("curve_number");
        let report = scenario.run(&dir).unwrap();
        let table = Table::read(dir.join("curve_number.csv"), &CsvConfig::default()).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_relative_eq!(report.get("runoff volume change [%]").unwrap(), 297.2303, epsilon = 1e-4);
        assert_relative_eq!(report.get("forest Q [in]").unwrap(), 0.882168, epsilon = 1e-6);
        assert_eq!(table.columns().len(), 4);
    }

    #[test]
    fn unit_hydrograph_and_new_storm() {
        let scenario = Scenario::from_toml_str(
            r#"
            [unit_hydrograph]
            times = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0]
            streamflow = [50.0, 60.0, 80.0, 70.0, 55.0, 50.0]
            baseflow = 50.0
            area = 324000000.0

            [unit_hydrograph.storm]
            interval = 2.0
            rates = [1.0, 3.0, 2.0, 0.2]
            infiltration_fraction = 0.5
            "#,
            ".",
        )
        .unwrap();
        let dir = output_dir("unit_hydrograph");
        let report = scenario.run(&dir).unwrap();
        let modeled = Table::read(dir.join("modeled_streamflow.csv"), &CsvConfig::default()).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_relative_eq!(report.get("unit hydrograph runoff volume [m3]").unwrap(), 234_000.0);
        assert_relative_eq!(report.get("unit hydrograph time to peak [hr]").unwrap(), 2.0);
        assert_relative_eq!(
            report.get("new storm effective rainfall [cm]").unwrap(),
            7.35,
            epsilon = 1e-12
        );
        // 4 pulses of 2 hr over a 1 hr unit hydrograph of 6 ordinates
        assert_eq!(modeled.row_count(), 8 + 6 - 1);
        assert_relative_eq!(modeled.column("Streamflow (m3/s)").unwrap()[0], 50.0);
        assert_eq!(report.files.len(), 5);
    }

    #[test]
    fn hypsometric_from_table_file() {
        let dir = output_dir("hypsometric");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("bands.csv"),
            "Lower altitude (m),Area within altitude range (km2)\n600,5\n400,15\n200,30\n",
        )
        .unwrap();
        let scenario = Scenario::from_toml_str("[hypsometric]\ntable = { path = \"bands.csv\" }\n", &dir).unwrap();
        let report = scenario.run(dir.join("out")).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_relative_eq!(report.get("watershed area [km2]").unwrap(), 50.0);
        assert_eq!(report.files.len(), 3);
    }

    #[test]
    fn bundled_scenarios_run() {
        let scenarios = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
        let mut entries: Vec<PathBuf> = fs::read_dir(&scenarios)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        entries.sort();
        assert_eq!(entries.len(), 6);

        for path in entries {
            let scenario = Scenario::from_path(&path).unwrap();
            let stem = path.file_stem().unwrap().to_string_lossy().into_owned();
            let dir = output_dir(&format!("bundled_{stem}"));
            let report = scenario.run(&dir).unwrap();
            fs::remove_dir_all(&dir).unwrap();
            assert!(!report.values.is_empty(), "{stem} produced no results");
        }
    }

    #[test]
    fn unknown_sections_are_rejected() {
        assert!(Scenario::from_toml_str("[infiltrashun]\nk = 1.0\n", ".").is_err());
    }
}
