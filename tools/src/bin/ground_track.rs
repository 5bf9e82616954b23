// cargo run --bin ground-track -- --catalog-id 25544 --start 2024-03-01T00:00:00Z --duration 3h --step 1m catalog.txt

use clap::Parser;
use std::{fs, path::PathBuf, time::Duration};
use tracing_subscriber::EnvFilter;

use orbit_types::prelude::*;
use tracker_lib::{frames::to_geodetic, sgp4::Propagator};

/// Print the sub-satellite point of one object over a time span
#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// NORAD catalog number, numeric or Alpha-5
    #[arg(short = 'i', long)]
    catalog_id: CatalogId,

    /// Start instant (RFC 3339), defaults to the element set epoch
    #[arg(short = 's', long)]
    start: Option<UtcTimestamp>,

    /// Length of the track, e.g. "90m"
    #[arg(short = 'd', long, value_parser = humantime::parse_duration)]
    duration: Duration,

    /// Time between samples, e.g. "30s"
    #[arg(short = 't', long, value_parser = humantime::parse_duration)]
    step: Duration,

    /// Catalog file containing the object
    input: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let opts = Opts::parse();
    if opts.step.is_zero() {
        return Err("Step must be greater than zero".into());
    }

    let text = fs::read_to_string(&opts.input)?;
    let obj = tle_parser::parse(&text)
        .objects
        .into_iter()
        .find(|o| o.catalog_id() == opts.catalog_id)
        .ok_or_else(|| format!("No element set for {} in the catalog", opts.catalog_id))?;

    let propagator = Propagator::new(&obj.elements)?;
    let start = opts.start.unwrap_or_else(|| propagator.epoch());
    let step = chrono::Duration::from_std(opts.step)?;
    let samples = opts.duration.as_nanos() / opts.step.as_nanos();

    println!("# {} ({}), {}", obj.label(), obj.catalog_id(), propagator.model());
    println!("{:<32} {:>9} {:>10} {:>10}", "TIME", "LAT", "LON", "ALT");
    let mut t = start;
    for _ in 0..=samples {
        match propagator.state_at(t).map(|s| to_geodetic(&s)) {
            Ok(Ok(p)) => println!(
                "{:<32} {:>9.4} {:>10.4} {:>10.3}",
                t.to_rfc3339(),
                p.latitude,
                p.longitude,
                p.altitude
            ),
            Ok(Err(e)) => println!("{:<32} {e}", t.to_rfc3339()),
            Err(e) => {
                println!("{:<32} {e}", t.to_rfc3339());
                break;
            }
        }
        t += step;
    }

    Ok(())
}
