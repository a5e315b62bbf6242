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

use anyhow::Result;
use indicatif::MultiProgress;
use std::time::Duration;

use crate::config::Config;
use crate::device::probe_device;
use crate::executor::{OpFuture, OpOutcome, SessionLimit};
use crate::inventory::Record;
use crate::report::Report;

use super::{create_progress_style, execute_and_report, finish_spinner, format_command_header, setup_spinner};

/// Reachability probes get a short budget; they only open a TCP socket.
const PROBE_TIMEOUT_SECS: u64 = 10;

/// Check SSH reachability of every record.
pub async fn probe_devices(
    records: &[Record],
    config: &Config,
    limit: SessionLimit,
    cli_timeout: Option<u64>,
) -> Result<Report> {
    let budget = Duration::from_secs(cli_timeout.unwrap_or(PROBE_TIMEOUT_SECS));
    let port = config.port();

    println!("{}", format_command_header("Probing", records.len()));

    let multi_progress = MultiProgress::new();
    let style = create_progress_style()?;

    let mut ops: Vec<(OpFuture<OpOutcome>, Record)> = Vec::with_capacity(records.len());
    for record in records {
        let target = record.target().to_string();
        let pb = setup_spinner(&multi_progress, record, style.clone());

        let fut: OpFuture<OpOutcome> = Box::pin(async move {
            let result = probe_device(target, port, budget).await;
            finish_spinner(&pb, &result);
            result
        });
        ops.push((fut, record.clone()));
    }

    execute_and_report(ops, limit).await
}
