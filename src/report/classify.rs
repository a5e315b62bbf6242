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

//! Classification of drained completions into report entries.

use crate::errors::OpError;
use crate::executor::{Completions, OpOutcome};
use crate::inventory::Record;
use crate::report::aggregate::Report;
use crate::report::reason::failure_reason;

/// Reason recorded when a device rejected every configured credential.
pub const ALL_CREDENTIALS_FAILED: &str = "all credentials failed";

/// Drain a fan-out to exhaustion, classifying each completion as it
/// arrives. Completions are processed strictly one at a time, so the
/// report needs no locking. No failure aborts the run.
pub async fn collect_outcomes(mut completions: Completions<OpOutcome>, report: &mut Report) {
    while let Some((outcome, record)) = completions.next().await {
        classify(outcome, record, report);
    }
}

/// Classify one completion into the report's partitions.
pub fn classify(outcome: Result<OpOutcome, OpError>, record: Record, report: &mut Report) {
    match outcome {
        Ok(OpOutcome::Passed(detail)) => {
            tracing::info!(host = %record.host, "ok");
            let detail = detail.unwrap_or_else(|| "ok".to_string());
            report.record_success(record, detail);
        }
        Ok(OpOutcome::NoCredentials) => {
            tracing::error!(host = %record.host, "{ALL_CREDENTIALS_FAILED}");
            report.record_failure(record, ALL_CREDENTIALS_FAILED);
        }
        Err(err) => {
            let reason = failure_reason(&err);
            if err.is_timeout() {
                tracing::warn!(host = %record.host, "{reason}");
            } else {
                tracing::error!(host = %record.host, "{reason}");
            }
            report.record_failure(record, reason);
        }
    }
}
