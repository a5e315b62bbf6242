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

//! Inventory filtering.
//!
//! Filter expressions take two forms:
//!   - `<field>=<regex>` where field is one of `host`, `ipaddr`, `os_name`;
//!     the regex is anchored and matched case-insensitively.
//!   - `@<filename>` — a hostname allow-list, either a CSV file with a
//!     `host` column or a plain file with one hostname per line.
//!
//! Limit filters keep records matching all constraints; exclude filters
//! drop records matching any constraint.

use anyhow::{bail, Context, Result};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::path::Path;

use crate::inventory::Record;

const FILTER_FIELDS: &[&str] = &["host", "ipaddr", "os_name"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Keep records matching every constraint.
    Limit,
    /// Drop records matching any constraint.
    Exclude,
}

#[derive(Debug)]
enum Constraint {
    Field { name: &'static str, pattern: Regex },
    Hosts { hosts: HashSet<String> },
}

#[derive(Debug)]
pub struct InventoryFilter {
    mode: FilterMode,
    constraints: Vec<Constraint>,
}

impl InventoryFilter {
    /// Parse a set of filter expressions. An empty set allows everything.
    pub fn parse(mode: FilterMode, exprs: &[String]) -> Result<Self> {
        let mut constraints = Vec::with_capacity(exprs.len());

        for expr in exprs {
            if let Some(filename) = expr.strip_prefix('@') {
                constraints.push(hosts_from_file(Path::new(filename))?);
                continue;
            }

            let Some((field, value)) = expr.split_once('=') else {
                bail!("Invalid filter expression: {expr}");
            };

            let Some(name) = FILTER_FIELDS.iter().find(|f| **f == field) else {
                bail!(
                    "Invalid filter expression: {expr}: unknown field {field:?} \
                     (expected one of {FILTER_FIELDS:?})"
                );
            };

            let pattern = RegexBuilder::new(&format!("^{value}$"))
                .case_insensitive(true)
                .build()
                .with_context(|| format!("Invalid filter expression: {expr}"))?;

            constraints.push(Constraint::Field { name, pattern });
        }

        Ok(Self { mode, constraints })
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Whether a record survives this filter.
    pub fn allows(&self, record: &Record) -> bool {
        match self.mode {
            FilterMode::Limit => self.constraints.iter().all(|c| c.matches(record)),
            FilterMode::Exclude => !self.constraints.iter().any(|c| c.matches(record)),
        }
    }
}

impl Constraint {
    fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Field { name, pattern } => pattern.is_match(field_value(record, name)),
            Self::Hosts { hosts } => hosts.contains(&record.host),
        }
    }
}

fn field_value<'r>(record: &'r Record, name: &str) -> &'r str {
    match name {
        "host" => &record.host,
        "ipaddr" => record.ipaddr.as_deref().unwrap_or(""),
        _ => &record.os_name,
    }
}

fn hosts_from_file(path: &Path) -> Result<Constraint> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read filter file at {path:?}"))?;

    let hosts = if path.extension().is_some_and(|ext| ext == "csv") {
        hosts_from_csv(&content).with_context(|| format!("Failed to parse filter file {path:?}"))?
    } else {
        content
            .lines()
            .filter(|line| !line.starts_with('#'))
            .filter_map(|line| line.split([' ', '\t', ',']).next())
            .filter(|host| !host.is_empty())
            .map(str::to_string)
            .collect()
    };

    Ok(Constraint::Hosts { hosts })
}

fn hosts_from_csv(content: &str) -> Result<HashSet<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers().context("missing CSV header")?;
    let Some(host_idx) = headers.iter().position(|h| h == "host") else {
        bail!("filter CSV has no 'host' column");
    };

    let mut hosts = HashSet::new();
    for row in reader.records() {
        let row = row?;
        if let Some(host) = row.get(host_idx) {
            hosts.insert(host.to_string());
        }
    }
    Ok(hosts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record> {
        vec![
            Record {
                host: "sw-core1".to_string(),
                ipaddr: Some("10.0.0.1".to_string()),
                os_name: "ios".to_string(),
            },
            Record {
                host: "sw-edge1".to_string(),
                ipaddr: None,
                os_name: "eos".to_string(),
            },
        ]
    }

    #[test]
    fn test_limit_requires_all_constraints() {
        let filter = InventoryFilter::parse(
            FilterMode::Limit,
            &["host=sw-.*".to_string(), "os_name=ios".to_string()],
        )
        .unwrap();

        let recs = records();
        assert!(filter.allows(&recs[0]));
        assert!(!filter.allows(&recs[1]));
    }

    #[test]
    fn test_exclude_rejects_on_any_match() {
        let filter =
            InventoryFilter::parse(FilterMode::Exclude, &["os_name=eos".to_string()]).unwrap();

        let recs = records();
        assert!(filter.allows(&recs[0]));
        assert!(!filter.allows(&recs[1]));
    }

    #[test]
    fn test_empty_filter_allows_everything() {
        let filter = InventoryFilter::parse(FilterMode::Limit, &[]).unwrap();
        assert!(records().iter().all(|r| filter.allows(r)));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = InventoryFilter::parse(FilterMode::Limit, &["vendor=cisco".to_string()]);
        assert!(err.is_err());
    }

    #[test]
    fn test_bad_regex_is_rejected() {
        let err = InventoryFilter::parse(FilterMode::Limit, &["host=[".to_string()]);
        assert!(err.is_err());
    }
}
