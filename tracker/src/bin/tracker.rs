use chrono::Utc;
use clap::Parser;
use orbit_types::prelude::*;
use std::{io, path::PathBuf, time::Duration};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tracker_lib::{
    batch::compute_batch,
    config::{self, Config},
    filter::{filter_by_window, select_by_name},
    report::{OutputFormat, Report},
    source::{self, TransportFailure},
};

#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Configuration toml file.
    ///
    /// Command line options take precedence over the file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// The instant to compute positions at (RFC 3339), defaults to now
    #[arg(long)]
    at: Option<UtcTimestamp>,

    /// Only report objects inside LAT,LON,RADIUS (degrees)
    #[arg(long, value_parser = parse_window, allow_hyphen_values = true)]
    window: Option<config::Window>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Number of worker threads
    #[arg(long)]
    concurrency: Option<usize>,

    /// Give up on objects not started within this long, e.g. "2s"
    #[arg(long, value_parser = humantime::parse_duration)]
    deadline: Option<Duration>,

    /// Repeat every interval, e.g. "30s", until interrupted
    #[arg(long, value_parser = humantime::parse_duration)]
    every: Option<Duration>,

    /// Only track objects whose name matches this regex
    #[arg(long)]
    include: Option<String>,

    /// The element set source. This can either be a file path, an
    /// http(s) URL or '-' for stdin.
    ///
    /// CelesTrak's Starlink group is used when not provided.
    source: Option<String>,
}

impl Opts {
    fn config(&self) -> Result<Config, config::ConfigError> {
        let mut cfg = match &self.config {
            Some(p) => Config::load(p)?,
            None => Config::default(),
        };
        if let Some(s) = &self.source {
            cfg.source = Some(s.clone());
        }
        if let Some(w) = self.window {
            cfg.window = Some(w);
        }
        if let Some(n) = self.concurrency {
            cfg.concurrency = Some(n);
        }
        if let Some(d) = self.deadline {
            cfg.deadline = Some(d);
        }
        if let Some(re) = &self.include {
            cfg.include = Some(re.clone());
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let opts = Opts::parse();

    let intr = interruptor::Interruptor::new();
    let intr_clone = intr.clone();
    ctrlc::set_handler(move || {
        if intr_clone.is_set() {
            let exit_code = if cfg!(target_family = "unix") {
                // 128 (fatal error signal "n") + 2 (control-c is fatal error signal 2)
                130
            } else {
                // Windows code 3221225786
                // -1073741510 == C000013A
                -1073741510
            };
            std::process::exit(exit_code);
        } else {
            intr_clone.set();
        }
    })?;

    let cfg = opts.config()?;
    let source_cfg = cfg.source_config()?;
    let window = cfg.query_window()?;
    let include = cfg.include_pattern()?;
    let batch_opts = cfg.batch_options();

    loop {
        let instant = opts.at.unwrap_or_else(Utc::now);
        match run_cycle(&source_cfg, instant) {
            Ok(objects) => {
                let objects = match &include {
                    Some(re) => select_by_name(objects, re),
                    None => objects,
                };
                let batch = compute_batch(&objects, instant, &batch_opts);
                let positions = match &window {
                    Some(w) => filter_by_window(&batch.positions, w),
                    None => batch.positions,
                };
                let report = Report {
                    instant,
                    window,
                    positions: &positions,
                    failures: &batch.failures,
                    skipped: batch.skipped,
                };
                report.write(opts.format, &mut io::stdout().lock())?;
            }
            // A failed fetch only ends the program when there is no next cycle
            Err(e) if opts.every.is_some() => {
                error!(source = %source_cfg.source, err = %e, "Failed to fetch element sets");
            }
            Err(e) => return Err(e.into()),
        }

        match opts.every {
            Some(period) if !intr.sleep(period) => (),
            _ => break,
        }
    }

    info!("Stopped");
    Ok(())
}

fn run_cycle(
    source_cfg: &source::SourceConfig,
    instant: UtcTimestamp,
) -> Result<Vec<TrackedObject>, TransportFailure> {
    let text = source::fetch(source_cfg)?;
    let parsed = tle_parser::parse(&text);
    for f in &parsed.failures {
        warn!(line = f.line, name = ?f.name, reason = %f.kind, "Skipping element set");
    }
    info!(
        %instant,
        objects = parsed.objects.len(),
        rejected = parsed.failures.len(),
        "Parsed element sets"
    );
    Ok(parsed.objects)
}

fn parse_window(s: &str) -> Result<config::Window, String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|e| e.to_string())?;
    match values[..] {
        [latitude, longitude, radius] => Ok(config::Window {
            latitude,
            longitude,
            radius,
        }),
        _ => Err(format!("Expected LAT,LON,RADIUS, got '{s}'")),
    }
}

mod interruptor {
    use std::sync::atomic::{AtomicBool, Ordering::SeqCst};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    const POLL_INTERVAL: Duration = Duration::from_millis(100);

    #[derive(Clone, Debug)]
    #[repr(transparent)]
    pub struct Interruptor(Arc<AtomicBool>);

    impl Interruptor {
        pub fn new() -> Self {
            Interruptor(Arc::new(AtomicBool::new(false)))
        }

        pub fn set(&self) {
            self.0.store(true, SeqCst);
        }

        pub fn is_set(&self) -> bool {
            self.0.load(SeqCst)
        }

        /// Sleep for `period`, returns true if interrupted while waiting
        pub fn sleep(&self, period: Duration) -> bool {
            let until = Instant::now() + period;
            while !self.is_set() {
                let now = Instant::now();
                if now >= until {
                    return false;
                }
                std::thread::sleep(POLL_INTERVAL.min(until - now));
            }
            true
        }
    }

    impl Default for Interruptor {
        fn default() -> Self {
            Self::new()
        }
    }
}
