use std::path::PathBuf;

use clap::ArgAction;
use clap::Parser;

use cyclefold::model::Complex;
use cyclefold::model::Model;
use cyclefold::partition::Partition;
use cyclefold::partition::PartitionOptions;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Partition function of a (multi-strand) nucleic acid complex.",
)]
struct Cli {
    /// Strands, 5' to 3'. Separate strands by whitespace or '+'.
    #[arg(required = true, value_name = "STRAND")]
    strands: Vec<String>,

    /// Model parameters and catalogs as JSON. Defaults to the built-in model.
    #[arg(short, long, value_name = "PATH")]
    model: Option<PathBuf>,

    /// Disable coaxial stacking.
    #[arg(long)]
    no_coax: bool,

    /// Treat a single strand as a covalently closed circle.
    #[arg(long)]
    circular: bool,

    /// Dot-bracket string of base pairs every structure must contain.
    #[arg(short, long, value_name = "DOT-BRACKET")]
    structure: Option<String>,

    /// Report dZ/dKd for this base-pair type, e.g. "CG".
    #[arg(short, long, value_name = "TYPE")]
    deriv: Option<String>,

    /// Relative tolerance of the root invariance check.
    #[arg(long, value_name = "FLOAT", default_value_t = 1.0e-7)]
    tolerance: f64,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let mut model = match &cli.model {
        Some(path) => Model::from_json_file(path)?,
        None => Model::default(),
    };
    if cli.no_coax {
        model.set_params(model.params().clone().without_coax())?;
    }

    let mut complex = if cli.circular {
        Complex::circular(&cli.strands.concat())?
    } else {
        Complex::try_from(cli.strands.join(" ").as_str())?
    };
    if let Some(structure) = &cli.structure {
        complex = complex.with_constraint(structure)?;
    }
    log::info!("Complex: {complex} ({} strands, N = {}).", complex.strand_count(), complex.len());

    let calc_deriv = cli
        .deriv
        .as_deref()
        .map(|name| model.find_base_pair_type(name))
        .transpose()?;
    let options = PartitionOptions {
        calc_deriv,
        calc_contrib: false,
        tolerance: cli.tolerance,
    };

    let part = Partition::compute(&complex, &model, options)?;
    part.run_cross_checks()?;

    println!("{complex}");
    println!("Z  = {:e}", part.z());
    println!("dG = {:.2} kcal/mol", part.dg());
    if let Some(name) = &cli.deriv {
        println!("dZ/dKd[{name}] = {:e}", part.dz());
    }
    Ok(())
}
