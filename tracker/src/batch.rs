//! Positions of a whole catalog at one instant.
//!
//! Objects are independent; a failure is recorded against its object and the
//! rest of the batch carries on.

use crate::{
    frames::{self, FrameError},
    sgp4::{self, PropagationFailure},
};
use orbit_types::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct BatchOptions {
    /// Worker threads, `None` uses the global rayon pool
    pub concurrency: Option<usize>,
    /// Objects not started within this long of the batch start are skipped
    pub deadline: Option<Duration>,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct NamedPosition {
    pub label: String,
    pub catalog_id: CatalogId,
    #[serde(flatten)]
    pub position: GeodeticPosition,
}

#[derive(Copy, Clone, PartialEq, Debug, thiserror::Error)]
pub enum FailureReason {
    #[error(transparent)]
    Propagation(#[from] PropagationFailure),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

#[derive(Clone, PartialEq, Debug, thiserror::Error)]
#[error("{label} ({catalog_id}): {reason}")]
pub struct BatchFailure {
    pub label: String,
    pub catalog_id: CatalogId,
    pub reason: FailureReason,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct BatchOutput {
    /// In catalog order
    pub positions: Vec<NamedPosition>,
    pub failures: Vec<BatchFailure>,
    /// Objects not started before the deadline
    pub skipped: usize,
}

enum Outcome {
    Position(NamedPosition),
    Failure(BatchFailure),
    Skipped,
}

/// Geodetic position of one object at `instant`
pub fn compute_position(
    object: &TrackedObject,
    instant: UtcTimestamp,
) -> Result<NamedPosition, BatchFailure> {
    let failure = |reason: FailureReason| BatchFailure {
        label: object.label(),
        catalog_id: object.catalog_id(),
        reason,
    };
    let state = sgp4::propagate(&object.elements, instant).map_err(|e| failure(e.into()))?;
    let position = frames::to_geodetic(&state).map_err(|e| failure(e.into()))?;
    Ok(NamedPosition {
        label: object.label(),
        catalog_id: object.catalog_id(),
        position,
    })
}

/// Positions of every object at `instant`, computed in parallel.
///
/// Output order follows `objects`. When a deadline is set, work that has
/// started is always finished and only objects not yet started are skipped.
pub fn compute_batch(
    objects: &[TrackedObject],
    instant: UtcTimestamp,
    options: &BatchOptions,
) -> BatchOutput {
    let started = Instant::now();
    let deadline = options.deadline.map(|d| started + d);
    let expired = AtomicBool::new(false);

    let out = run_batch(objects, instant, options.concurrency, || {
        past_deadline(deadline, &expired)
    });

    if out.skipped != 0 {
        warn!(skipped = out.skipped, "Batch deadline expired");
    }
    info!(
        %instant,
        objects = objects.len(),
        positions = out.positions.len(),
        failures = out.failures.len(),
        skipped = out.skipped,
        elapsed = ?started.elapsed(),
        "Computed batch"
    );
    out
}

/// Compute every object for which `expired` returns false when it is about to start
pub(crate) fn run_batch<F>(
    objects: &[TrackedObject],
    instant: UtcTimestamp,
    concurrency: Option<usize>,
    expired: F,
) -> BatchOutput
where
    F: Fn() -> bool + Sync,
{
    let run = || -> Vec<Outcome> {
        objects
            .par_iter()
            .map(|obj| {
                if expired() {
                    return Outcome::Skipped;
                }
                match compute_position(obj, instant) {
                    Ok(p) => {
                        debug!(catalog_id = %p.catalog_id, name = %p.label, position = %p.position, "Computed position");
                        Outcome::Position(p)
                    }
                    Err(f) => {
                        warn!(catalog_id = %f.catalog_id, name = %f.label, reason = %f.reason, "Object failed");
                        Outcome::Failure(f)
                    }
                }
            })
            .collect()
    };

    let outcomes = match concurrency {
        Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(run),
            Err(e) => {
                warn!(threads, err = %e, "Failed to build a thread pool, using the global pool");
                run()
            }
        },
        None => run(),
    };

    let mut out = BatchOutput::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Position(p) => out.positions.push(p),
            Outcome::Failure(f) => out.failures.push(f),
            Outcome::Skipped => out.skipped += 1,
        }
    }
    out
}

fn past_deadline(deadline: Option<Instant>, expired: &AtomicBool) -> bool {
    if expired.load(Ordering::Relaxed) {
        return true;
    }
    match deadline {
        Some(d) if Instant::now() >= d => {
            expired.store(true, Ordering::Relaxed);
            true
        }
        _ => false,
    }
}
