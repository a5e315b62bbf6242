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

//! Failure taxonomy for device operations.

use std::io;

use thiserror::Error;

/// Everything that can go wrong while running one device operation.
///
/// Drivers return this from every operation so the classification loop can
/// treat heterogeneous failures uniformly. Domain-level negative results
/// (e.g. no credential matched) are not errors and live in
/// [`crate::executor::OpOutcome`] instead.
#[derive(Debug, Error)]
pub enum OpError {
    /// A reason that is already in its final, report-ready form.
    #[error("{0}")]
    Reason(String),

    /// The operation did not finish within its time budget.
    #[error("TIMEOUT{}", .detail.as_deref().map(|d| format!(" {d}")).unwrap_or_default())]
    Timeout { detail: Option<String> },

    /// The remote session could not be established or was torn down,
    /// usually carrying a platform error code.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Any other failure surfacing from a driver.
    #[error("{kind}: {message}")]
    Other { kind: String, message: String },
}

impl OpError {
    pub fn timeout() -> Self {
        Self::Timeout { detail: None }
    }

    pub fn other(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Other {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Convert an SSH library failure, surfacing the underlying OS error
    /// code when the source chain carries one.
    pub fn from_ssh(err: russh::Error) -> Self {
        if let Some(code) = os_error_code(&err) {
            return Self::Io(io::Error::from_raw_os_error(code));
        }
        Self::Other {
            kind: "Ssh".to_string(),
            message: err.to_string(),
        }
    }

    /// A task that never produced an outcome (panicked or was aborted)
    /// still has to show up in the report.
    pub(crate) fn from_join(err: tokio::task::JoinError) -> Self {
        let kind = if err.is_panic() {
            "TaskPanic"
        } else {
            "TaskCancelled"
        };
        Self::Other {
            kind: kind.to_string(),
            message: err.to_string(),
        }
    }
}

fn os_error_code(err: &(dyn std::error::Error + 'static)) -> Option<i32> {
    let mut cur: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = cur {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if let Some(code) = io_err.raw_os_error() {
                return Some(code);
            }
        }
        cur = e.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_displays_bare_keyword() {
        assert_eq!(OpError::timeout().to_string(), "TIMEOUT");
    }

    #[test]
    fn timeout_detail_is_appended() {
        let err = OpError::Timeout {
            detail: Some("30s".to_string()),
        };
        assert_eq!(err.to_string(), "TIMEOUT 30s");
    }

    #[test]
    fn os_error_code_walks_the_source_chain() {
        let refused = io::Error::from_raw_os_error(nix::errno::Errno::ECONNREFUSED as i32);
        let wrapped = anyhow::Error::from(refused).context("connect failed");
        let code = os_error_code(wrapped.as_ref());
        assert_eq!(code, Some(nix::errno::Errno::ECONNREFUSED as i32));
    }
}
