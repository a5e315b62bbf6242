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

//! Device inventory loading.
//!
//! The inventory is a CSV file with a `host,ipaddr,os_name` header. Lines
//! starting with `#` are comments. `ipaddr` may be empty, in which case
//! connections are made to `host` directly.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// One inventory entry describing a target device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Record {
    pub host: String,
    #[serde(default)]
    pub ipaddr: Option<String>,
    pub os_name: String,
}

impl Record {
    pub fn new(host: impl Into<String>, os_name: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ipaddr: None,
            os_name: os_name.into(),
        }
    }

    /// The address to connect to: `ipaddr` when present, `host` otherwise.
    pub fn target(&self) -> &str {
        match self.ipaddr.as_deref() {
            Some(ip) if !ip.is_empty() => ip,
            _ => &self.host,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.host, self.os_name)
    }
}

/// Load all records from an inventory CSV file.
pub async fn load(path: &Path) -> Result<Vec<Record>> {
    let content = tokio::fs::read_to_string(path).await.with_context(|| {
        format!(
            "Failed to read inventory file at {path:?}. \
             Please check the path and file permissions."
        )
    })?;

    parse(&content).with_context(|| format!("Failed to parse inventory file at {path:?}"))
}

fn parse(content: &str) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: Record = row.context("malformed inventory row")?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_inventory() {
        let csv = "host,ipaddr,os_name\nsw1,10.0.0.1,ios\nsw2,,eos\n";
        let records = parse(csv).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].host, "sw1");
        assert_eq!(records[0].target(), "10.0.0.1");
        assert_eq!(records[1].os_name, "eos");
    }

    #[test]
    fn test_empty_ipaddr_falls_back_to_host() {
        let csv = "host,ipaddr,os_name\ncore1,,junos\n";
        let records = parse(csv).unwrap();
        assert_eq!(records[0].target(), "core1");
    }

    #[test]
    fn test_comment_lines_are_skipped() {
        let csv = "host,ipaddr,os_name\n# staging gear below\nsw1,,ios\n";
        let records = parse(csv).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let csv = "host,ipaddr\nsw1,10.0.0.1\n";
        assert!(parse(csv).is_err());
    }
}
