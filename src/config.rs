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

use anyhow::{bail, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Command timeout applied when neither the CLI, the OS spec, nor the
/// config file provides one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const DEFAULT_SSH_PORT: u16 = 22;
const DEFAULT_INVENTORY: &str = "inventory.csv";
const DEFAULT_CONFIGS_DIR: &str = "configs";

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    /// Credentials tried in order against every device.
    #[serde(default)]
    pub credentials: Vec<Credential>,

    /// Per-`os_name` overrides keyed by the inventory's `os_name` column.
    #[serde(default)]
    pub os: HashMap<String, OsSpec>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Defaults {
    pub inventory: Option<PathBuf>,
    pub configs_dir: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub batch: Option<usize>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct OsSpec {
    /// Commands run before the config capture, typically to disable
    /// terminal paging.
    #[serde(default)]
    pub pre_commands: Vec<String>,

    /// Command whose output is the device configuration.
    pub show_config: Option<String>,

    pub timeout: Option<u64>,
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        let expanded_path = expand_tilde(path);

        if !expanded_path.exists() {
            tracing::debug!(
                "Config file not found at {:?}, using defaults",
                expanded_path
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&expanded_path)
            .await
            .with_context(|| format!("Failed to read configuration file at {expanded_path:?}. Please check file permissions and ensure the file is accessible."))?;

        let config: Config =
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse YAML configuration file at {expanded_path:?}. Please check the YAML syntax is valid.\nCommon issues:\n  - Incorrect indentation (use spaces, not tabs)\n  - Missing colons after keys\n  - Unquoted special characters"))?;

        Ok(config)
    }

    /// Inventory path precedence: CLI flag, config file, `inventory.csv`.
    pub fn inventory_path(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.defaults.inventory.clone())
            .map(|p| expand_tilde(&p))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INVENTORY))
    }

    /// Directory where captured configurations are written.
    pub fn configs_dir(&self) -> PathBuf {
        self.defaults
            .configs_dir
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIGS_DIR))
    }

    /// Timeout precedence: CLI flag, OS spec, config default, built-in.
    pub fn timeout(&self, cli: Option<u64>, os_name: &str) -> u64 {
        cli.or_else(|| self.os_spec(os_name).timeout)
            .or(self.defaults.timeout)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn batch(&self, cli: Option<usize>) -> Option<usize> {
        cli.or(self.defaults.batch)
    }

    pub fn port(&self) -> u16 {
        self.defaults.port.unwrap_or(DEFAULT_SSH_PORT)
    }

    /// The effective spec for an `os_name`: config overrides merged onto
    /// the built-in defaults for that platform.
    pub fn os_spec(&self, os_name: &str) -> OsSpec {
        let builtin = builtin_spec(os_name);
        let Some(custom) = self.os.get(os_name) else {
            return builtin;
        };

        OsSpec {
            pre_commands: if custom.pre_commands.is_empty() {
                builtin.pre_commands
            } else {
                custom.pre_commands.clone()
            },
            show_config: custom.show_config.clone().or(builtin.show_config),
            timeout: custom.timeout.or(builtin.timeout),
        }
    }

    /// Credentials with `${VAR}` references resolved from the
    /// environment. Fails when none are configured.
    pub fn expanded_credentials(&self) -> Result<Vec<Credential>> {
        if self.credentials.is_empty() {
            bail!(
                "no credentials configured; add a `credentials` section \
                 to the configuration file"
            );
        }

        Ok(self
            .credentials
            .iter()
            .map(|cred| Credential {
                username: expand_env(&cred.username),
                password: expand_env(cred.password.expose_secret()).into(),
            })
            .collect())
    }
}

fn builtin_spec(os_name: &str) -> OsSpec {
    match os_name {
        "ios" | "eos" | "nxos" => OsSpec {
            pre_commands: vec!["terminal length 0".to_string()],
            show_config: Some("show running-config".to_string()),
            timeout: None,
        },
        "junos" => OsSpec {
            pre_commands: vec!["set cli screen-length 0".to_string()],
            show_config: Some("show configuration".to_string()),
            timeout: None,
        },
        _ => OsSpec {
            pre_commands: Vec::new(),
            show_config: Some("show running-config".to_string()),
            timeout: None,
        },
    }
}

/// Expand `${VAR}` references against the process environment.
/// Unset variables are left as-is.
fn expand_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match env::var(name) {
                    Ok(value) => out.push_str(&value),
                    Err(_) => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str("${");
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = env::var_os("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
defaults:
  inventory: netinv.csv
  timeout: 30
  batch: 20

credentials:
  - username: admin
    password: sekrit

os:
  ios:
    timeout: 120
  junos:
    show_config: "show configuration | display set"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.defaults.batch, Some(20));
        assert_eq!(config.credentials.len(), 1);
        assert_eq!(config.timeout(None, "ios"), 120);
        assert_eq!(config.timeout(None, "eos"), 30);
        assert_eq!(config.timeout(Some(5), "ios"), 5);
    }

    #[test]
    fn test_os_spec_merges_onto_builtin() {
        let yaml = r#"
os:
  junos:
    show_config: "show configuration | display set"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let spec = config.os_spec("junos");
        assert_eq!(
            spec.show_config.as_deref(),
            Some("show configuration | display set")
        );
        assert_eq!(spec.pre_commands, vec!["set cli screen-length 0"]);
    }

    #[test]
    fn test_unknown_os_gets_generic_spec() {
        let config = Config::default();
        let spec = config.os_spec("mystery");
        assert_eq!(spec.show_config.as_deref(), Some("show running-config"));
    }

    #[test]
    fn test_timeout_falls_back_to_builtin_default() {
        let config = Config::default();
        assert_eq!(config.timeout(None, "ios"), DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_expand_env_substitutes_known_vars() {
        env::set_var("NETBAK_TEST_PASSWORD", "hunter2");
        assert_eq!(expand_env("${NETBAK_TEST_PASSWORD}"), "hunter2");
        assert_eq!(expand_env("${NETBAK_TEST_UNSET_VAR}"), "${NETBAK_TEST_UNSET_VAR}");
        assert_eq!(expand_env("plain"), "plain");
    }

    #[test]
    fn test_missing_credentials_is_an_error() {
        let config = Config::default();
        assert!(config.expanded_credentials().is_err());
    }
}
