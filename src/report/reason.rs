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

//! Failure-to-reason resolution.

use nix::errno::Errno;

use crate::errors::OpError;

/// Render a failure as a short, stable reason string.
///
/// Rules are tried in order; the last arm is total, so this never fails:
/// 1. an already-rendered reason passes through unchanged;
/// 2. a deadline expiration becomes `TIMEOUT` plus any detail;
/// 3. a transport failure with a known OS error code becomes the
///    platform's symbolic name for that code (e.g. `ECONNREFUSED`);
/// 4. anything else becomes `<Kind>: <message>`.
pub fn failure_reason(err: &OpError) -> String {
    match err {
        OpError::Reason(reason) => reason.clone(),
        OpError::Timeout { detail: None } => "TIMEOUT".to_string(),
        OpError::Timeout { detail: Some(d) } => format!("TIMEOUT {d}"),
        OpError::Io(io_err) => match io_err.raw_os_error().map(Errno::from_raw) {
            Some(errno) if errno != Errno::UnknownErrno => format!("{errno:?}"),
            _ => format!("{:?}: {io_err}", io_err.kind()),
        },
        OpError::Other { kind, message } => format!("{kind}: {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_string_reason_passes_through() {
        let err = OpError::Reason("all credentials failed".to_string());
        assert_eq!(failure_reason(&err), "all credentials failed");
    }

    #[test]
    fn test_bare_timeout() {
        assert_eq!(failure_reason(&OpError::timeout()), "TIMEOUT");
    }

    #[test]
    fn test_os_error_uses_symbolic_name() {
        let err = OpError::Io(io::Error::from_raw_os_error(Errno::ECONNREFUSED as i32));
        assert_eq!(failure_reason(&err), "ECONNREFUSED");
    }

    #[test]
    fn test_io_error_without_code_falls_through() {
        let err = OpError::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "short read"));
        let reason = failure_reason(&err);
        assert!(reason.contains("UnexpectedEof"));
        assert!(reason.contains("short read"));
    }

    #[test]
    fn test_default_rule_is_total() {
        let err = OpError::other("AuthFailed", "server closed the session");
        assert_eq!(failure_reason(&err), "AuthFailed: server closed the session");
    }
}
