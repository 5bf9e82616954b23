// cargo run --bin tle-check -- catalog.txt

use clap::Parser;
use std::{fs, path::PathBuf, process::ExitCode};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tracker_lib::sgp4::orbit_model;

/// Validate an element set catalog and print every rejected block
#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Also list the objects that parsed, with their orbit model
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Catalog file to check
    input: PathBuf,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let opts = Opts::parse();

    let text = fs::read_to_string(&opts.input)?;
    debug!(input = %opts.input.display(), bytes = text.len(), "Read catalog");
    let out = tle_parser::parse(&text);

    if opts.verbose {
        for obj in &out.objects {
            println!(
                "{:<24} {} epoch {} {}",
                obj.label(),
                obj.catalog_id(),
                obj.elements.epoch().to_rfc3339(),
                orbit_model(&obj.elements)
            );
        }
    }
    for f in &out.failures {
        println!("{}:{f}", opts.input.display());
    }
    println!(
        "{} element sets, {} rejected",
        out.objects.len(),
        out.failures.len()
    );

    Ok(if out.failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
