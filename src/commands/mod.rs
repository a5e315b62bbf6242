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

//! Command implementations built on the fan-out executor.

pub mod backup;
pub mod inventory;
pub mod login;
pub mod probe;

use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use crate::errors::OpError;
use crate::executor::{FanOut, OpFuture, OpOutcome, SessionLimit};
use crate::inventory::Record;
use crate::report::{collect_outcomes, failure_reason, Report};

const PROGRESS_BAR_TICK_RATE_MS: u64 = 80;

pub(crate) fn format_command_header(action: &str, device_count: usize) -> String {
    format!(
        "\n{} {} {} {}\n",
        "►".cyan().bold(),
        action.cyan(),
        device_count.to_string().bold(),
        if device_count == 1 {
            "device"
        } else {
            "devices"
        }
    )
}

pub(crate) fn create_progress_style() -> Result<ProgressStyle> {
    ProgressStyle::default_bar()
        .template("{prefix:.bold} {spinner:.cyan} {msg}")
        .map_err(|e| anyhow::anyhow!("Failed to create progress bar template: {e}"))
        .map(|style| style.tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷ "))
}

pub(crate) fn setup_spinner(
    multi_progress: &MultiProgress,
    record: &Record,
    style: ProgressStyle,
) -> ProgressBar {
    let pb = multi_progress.add(ProgressBar::new_spinner());
    pb.set_style(style);
    pb.set_prefix(format!("[{}]", record.host));
    pb.set_message(format!("{}", "Connecting...".cyan()));
    pb.enable_steady_tick(std::time::Duration::from_millis(PROGRESS_BAR_TICK_RATE_MS));
    pb
}

pub(crate) fn finish_spinner(pb: &ProgressBar, result: &Result<OpOutcome, OpError>) {
    match result {
        Ok(OpOutcome::Passed(_)) => {
            pb.finish_with_message(format!("{} {}", "●".green(), "Success".green()));
        }
        Ok(OpOutcome::NoCredentials) => {
            pb.finish_with_message(format!("{} {}", "●".red(), "All credentials failed".red()));
        }
        Err(err) => {
            let reason = failure_reason(err);
            let short = if reason.len() > 50 {
                format!("{}...", &reason[..47])
            } else {
                reason
            };
            pb.finish_with_message(format!("{} {}", "●".red(), short.red()));
        }
    }
}

/// Fan the operations out, classify every completion, and render the
/// report. Shared by all device commands.
pub(crate) async fn execute_and_report(
    ops: Vec<(OpFuture<OpOutcome>, Record)>,
    limit: SessionLimit,
) -> Result<Report> {
    let fanout = FanOut::new(limit);
    let mut report = Report::new();

    report.start_timing();
    let completions = fanout.drain(ops);
    collect_outcomes(completions, &mut report).await;
    report.stop_timing();

    report.print()?;
    Ok(report)
}
