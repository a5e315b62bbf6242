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

use anyhow::{Context, Result};
use indicatif::MultiProgress;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::device::{backup_config, DeviceOpts};
use crate::executor::{OpFuture, OpOutcome, SessionLimit};
use crate::inventory::Record;
use crate::report::Report;

use super::{create_progress_style, execute_and_report, finish_spinner, format_command_header, setup_spinner};

/// Back up the running configuration of every record.
pub async fn backup_configs(
    records: &[Record],
    config: &Config,
    limit: SessionLimit,
    cli_timeout: Option<u64>,
) -> Result<Report> {
    let configs_dir = config.configs_dir();
    tokio::fs::create_dir_all(&configs_dir)
        .await
        .with_context(|| format!("Failed to create configs directory at {configs_dir:?}"))?;

    let credentials = Arc::new(config.expanded_credentials()?);

    println!("{}", format_command_header("Backing up", records.len()));

    let multi_progress = MultiProgress::new();
    let style = create_progress_style()?;

    let mut ops: Vec<(OpFuture<OpOutcome>, Record)> = Vec::with_capacity(records.len());
    for record in records {
        let opts = DeviceOpts {
            port: config.port(),
            timeout: Duration::from_secs(config.timeout(cli_timeout, &record.os_name)),
            credentials: Arc::clone(&credentials),
            os: config.os_spec(&record.os_name),
        };
        let configs_dir = configs_dir.clone();
        let pb = setup_spinner(&multi_progress, record, style.clone());

        let record_for_op = record.clone();
        let fut: OpFuture<OpOutcome> = Box::pin(async move {
            let result = backup_config(record_for_op, opts, configs_dir).await;
            finish_spinner(&pb, &result);
            result
        });
        ops.push((fut, record.clone()));
    }

    execute_and_report(ops, limit).await
}
