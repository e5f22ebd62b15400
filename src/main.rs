/*!
Command-line front end: runs TOML scenarios and a few one-off calculations.
*/

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use watershed_hydro::logging::init_logging;
use watershed_hydro::runoff::{
    initial_abstraction, try_potential_max_retention, try_runoff_from_curve_number,
    validate_curve_number,
};
use watershed_hydro::{Scenario, SoilTextureTable, calculate_curve_number};

#[derive(Parser)]
#[command(name = "watershed_hydro")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Closed-form watershed hydrology calculations", long_about = None)]
struct Cli {
    /** Log level (trace, debug, info, warn, error); overrides the RUST_LOG default level */
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /** Evaluate a scenario file and write its tables and charts */
    Run(RunArgs),
    /** List the built-in soil texture classes */
    Textures,
    /** SCS curve number runoff for one storm */
    CurveNumber(CurveNumberArgs),
}

#[derive(Args)]
struct RunArgs {
    /** Scenario file (TOML) */
    scenario: PathBuf,

    /** Output directory */
    #[arg(short, long, default_value = "output")]
    output: PathBuf,
}

#[derive(Args)]
struct CurveNumberArgs {
    /** Storm precipitation [in] */
    #[arg(short, long)]
    precipitation: f64,

    /** Curve number; overrides the soil group / land use lookup */
    #[arg(long)]
    cn: Option<f64>,

    /** Hydrologic soil group (A-D) */
    #[arg(long, default_value = "B")]
    group: String,

    /** Land use, e.g. "row crops good" */
    #[arg(long, default_value = "pasture good")]
    land_use: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Textures => textures(),
        Commands::CurveNumber(args) => curve_number(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let scenario = Scenario::from_path(&args.scenario)
        .with_context(|| format!("loading {}", args.scenario.display()))?;
    let report = scenario
        .run(&args.output)
        .with_context(|| format!("running scenario '{}'", scenario.name))?;
    info!(
        "{} results, {} files written to {}",
        report.values.len(),
        report.files.len(),
        args.output.display()
    );
    Ok(())
}

fn textures() -> Result<()> {
    let table = SoilTextureTable::builtin()?;
    println!(
        "{:<18} {:>9} {:>9} {:>10} {:>8}",
        "texture", "porosity", "eff. por.", "psi [cm]", "Ks [cm/hr]"
    );
    for name in table.names() {
        if let Some(t) = table.get(name) {
            println!(
                "{name:<18} {:>9.3} {:>9.3} {:>10.2} {:>8.2}",
                t.porosity, t.effective_porosity, t.suction_head, t.ks
            );
        }
    }
    Ok(())
}

fn curve_number(args: CurveNumberArgs) -> Result<()> {
    let cn = match args.cn {
        Some(cn) => validate_curve_number(cn)?,
        None => calculate_curve_number(&args.group, &args.land_use)?,
    };
    let s = try_potential_max_retention(cn)?;
    println!("CN = {cn}");
    println!("S  = {s:.4} in");
    println!("Ia = {:.4} in", initial_abstraction(s));
    println!("Q  = {:.4} in", try_runoff_from_curve_number(args.precipitation, cn)?);
    Ok(())
}
