// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Run-level outcome aggregation and rendering.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::inventory::Record;

/// Name of the failure export written next to the summary.
pub const FAILURES_CSV: &str = "failures.csv";

const TIME_FORMAT: &str = "%Y-%b-%d %I:%M:%S %p";

#[derive(Debug, Clone, Copy)]
struct Stamp {
    wall: DateTime<Local>,
    mono: Instant,
}

impl Stamp {
    fn now() -> Self {
        Self {
            wall: Local::now(),
            mono: Instant::now(),
        }
    }
}

/// The accumulated, timed outcome set for one command invocation.
///
/// Every dispatched operation lands in exactly one partition, in arrival
/// order. `render` finalizes timing if the caller has not already done so
/// and overwrites any previous `failures.csv`; re-rendering overwrites the
/// file again, which is intended.
#[derive(Debug, Default)]
pub struct Report {
    started: Option<Stamp>,
    stopped: Option<Stamp>,
    ok: Vec<(Record, String)>,
    failed: Vec<(Record, String)>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_timing(&mut self) {
        self.started = Some(Stamp::now());
    }

    pub fn stop_timing(&mut self) {
        self.stopped = Some(Stamp::now());
    }

    pub fn record_success(&mut self, record: Record, detail: impl Into<String>) {
        self.ok.push((record, detail.into()));
    }

    pub fn record_failure(&mut self, record: Record, reason: impl Into<String>) {
        self.failed.push((record, reason.into()));
    }

    pub fn total(&self) -> usize {
        self.ok.len() + self.failed.len()
    }

    pub fn ok_count(&self) -> usize {
        self.ok.len()
    }

    pub fn fail_count(&self) -> usize {
        self.failed.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Record, &str)> {
        self.failed.iter().map(|(rec, reason)| (rec, reason.as_str()))
    }

    /// Elapsed monotonic time between `start_timing` and `stop_timing`.
    pub fn duration(&self) -> Result<Duration> {
        let started = self
            .started
            .context("report timing was never started")?;
        let stopped = self
            .stopped
            .context("report timing was never stopped")?;
        Ok(stopped.mono.duration_since(started.mono))
    }

    /// Render the summary to `out`; when failures exist, also write
    /// `failures.csv` into `dir`, replacing any previous file.
    pub fn render<W: Write>(&mut self, out: &mut W, dir: &Path) -> Result<()> {
        if self.started.is_none() {
            bail!("cannot render a report that was never started");
        }
        if self.stopped.is_none() {
            self.stop_timing();
        }

        let started = self.started.context("report timing was never started")?;
        let stopped = self.stopped.context("report timing was never stopped")?;
        let duration = self.duration()?;

        let rule = format!("# {}", "-".repeat(78));

        writeln!(out, "{rule}")?;
        writeln!(
            out,
            "Summary: TOTAL={}, OK={}, FAIL={}",
            self.total(),
            self.ok_count(),
            self.fail_count()
        )?;
        writeln!(
            out,
            "         START={}, STOP={}",
            started.wall.format(TIME_FORMAT),
            stopped.wall.format(TIME_FORMAT)
        )?;
        writeln!(out, "         DURATION={:.3}s", duration.as_secs_f64())?;

        if !self.failed.is_empty() {
            writeln!(out)?;
            self.write_failure_table(out)?;
            self.write_failures_csv(&dir.join(FAILURES_CSV))?;
        }

        writeln!(out, "{rule}")?;
        Ok(())
    }

    /// Render to stdout with the CSV in the current directory.
    pub fn print(&mut self) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        self.render(&mut stdout, Path::new("."))
    }

    fn write_failure_table<W: Write>(&self, out: &mut W) -> Result<()> {
        let host_width = self
            .failed
            .iter()
            .map(|(rec, _)| rec.host.len())
            .chain(["host".len()])
            .max()
            .unwrap_or(4);
        let os_width = self
            .failed
            .iter()
            .map(|(rec, _)| rec.os_name.len())
            .chain(["os_name".len()])
            .max()
            .unwrap_or(7);

        writeln!(
            out,
            "{:<host_width$}  {:<os_width$}  reason",
            "host", "os_name"
        )?;
        writeln!(
            out,
            "{:<host_width$}  {:<os_width$}  ------",
            "-".repeat(host_width),
            "-".repeat(os_width)
        )?;
        for (record, reason) in &self.failed {
            writeln!(
                out,
                "{:<host_width$}  {:<os_width$}  {reason}",
                record.host, record.os_name
            )?;
        }
        Ok(())
    }

    fn write_failures_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {path:?}"))?;
        writer.write_record(["host", "os_name", "reason"])?;
        for (record, reason) in &self.failed {
            writer.write_record([record.host.as_str(), record.os_name.as_str(), reason.as_str()])?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write {path:?}"))?;
        Ok(())
    }
}
