//! Presentation of a batch as a text table or JSON

use crate::batch::{BatchFailure, NamedPosition};
use orbit_types::prelude::*;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Report<'a> {
    pub instant: UtcTimestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<QueryWindow>,
    pub positions: &'a [NamedPosition],
    #[serde(serialize_with = "failure_messages")]
    pub failures: &'a [BatchFailure],
    pub skipped: usize,
}

impl<'a> Report<'a> {
    pub fn write<W: Write>(&self, format: OutputFormat, w: &mut W) -> io::Result<()> {
        match format {
            OutputFormat::Table => self.write_table(w),
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, self)?;
                writeln!(w)
            }
        }
    }

    pub fn write_table<W: Write>(&self, w: &mut W) -> io::Result<()> {
        match &self.window {
            Some(win) => writeln!(
                w,
                "{} objects within {} at {}",
                self.positions.len(),
                win,
                self.instant.to_rfc3339()
            )?,
            None => writeln!(
                w,
                "{} objects at {}",
                self.positions.len(),
                self.instant.to_rfc3339()
            )?,
        }
        writeln!(
            w,
            "{:<24} {:>6} {:>9} {:>10} {:>10}",
            "NAME", "NORAD", "LAT", "LON", "ALT"
        )?;
        for p in self.positions {
            writeln!(
                w,
                "{:<24} {:>6} {:>9.4} {:>10.4} {:>10.3}",
                p.label,
                p.catalog_id.to_string(),
                p.position.latitude, p.position.longitude, p.position.altitude
            )?;
        }
        if !self.failures.is_empty() || self.skipped != 0 {
            writeln!(
                w,
                "{} failed, {} skipped",
                self.failures.len(),
                self.skipped
            )?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct FailureRow<'a> {
    label: &'a str,
    catalog_id: CatalogId,
    reason: String,
}

fn failure_messages<S: serde::Serializer>(
    failures: &&[BatchFailure],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(failures.iter().map(|f| FailureRow {
        label: &f.label,
        catalog_id: f.catalog_id,
        reason: f.reason.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{batch::FailureReason, sgp4::PropagationFailure};
    use indoc::indoc;

    fn positions() -> Vec<NamedPosition> {
        vec![NamedPosition {
            label: "ISS (ZARYA)".to_owned(),
            catalog_id: CatalogId::new(25544).unwrap(),
            position: GeodeticPosition::new(51.2, -120.55556, 420.1234),
        }]
    }

    fn failures() -> Vec<BatchFailure> {
        vec![BatchFailure {
            label: "#11801".to_owned(),
            catalog_id: CatalogId::new(11801).unwrap(),
            reason: FailureReason::Propagation(PropagationFailure::Decayed),
        }]
    }

    #[test]
    fn table() {
        let (p, f) = (positions(), failures());
        let report = Report {
            instant: "2024-01-01T00:00:00Z".parse().unwrap(),
            window: None,
            positions: &p,
            failures: &f,
            skipped: 2,
        };
        let mut out = Vec::new();
        report.write(OutputFormat::Table, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            indoc! {"
                1 objects at 2024-01-01T00:00:00+00:00
                NAME                      NORAD       LAT        LON        ALT
                ISS (ZARYA)               25544   51.2000  -120.5556    420.123
                1 failed, 2 skipped
            "}
        );
    }

    #[test]
    fn json() {
        let p = positions();
        let f = failures();
        let report = Report {
            instant: "2024-01-01T00:00:00Z".parse().unwrap(),
            window: Some(QueryWindow::new(50.0, -120.0, 5.0).unwrap()),
            positions: &p,
            failures: &f,
            skipped: 0,
        };
        let mut out = Vec::new();
        report.write(OutputFormat::Json, &mut out).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["instant"], "2024-01-01T00:00:00Z");
        assert_eq!(v["window"]["radius"], 5.0);
        assert_eq!(v["positions"][0]["label"], "ISS (ZARYA)");
        assert_eq!(v["positions"][0]["catalog_id"], 25544);
        assert_eq!(v["positions"][0]["latitude"], 51.2);
        assert_eq!(v["failures"][0]["reason"], "Satellite has decayed");
        assert_eq!(v["skipped"], 0);
    }
}
