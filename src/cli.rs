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

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "netbak",
    version,
    about = "netbak - Parallel network device configuration backup",
    long_about = "netbak backs up device configurations, verifies logins, and probes reachability\nacross a large network device inventory concurrently. Operations run against every\ninventory record at once, bounded by a configurable session limit, and finish with a\nconsolidated success/failure report plus a failures.csv export.",
    after_help = "EXAMPLES:\n  Back up everything:             netbak backup\n  Back up one platform:           netbak --limit os_name=ios backup\n  Skip lab devices:               netbak --exclude host=lab-.* backup\n  Throttle concurrent sessions:   netbak --batch 20 backup\n  Verify credentials:             netbak login\n  Check SSH reachability:         netbak probe\n  Show the filtered inventory:    netbak --limit os_name=junos inventory"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'C',
        long,
        default_value = "netbak.yaml",
        help = "Configuration file path [default: ./netbak.yaml]\nMissing file is not an error; built-in defaults apply"
    )]
    pub config: PathBuf,

    #[arg(
        short = 'i',
        long,
        help = "Inventory CSV file with a host,ipaddr,os_name header\nOverrides the path from the configuration file"
    )]
    pub inventory: Option<PathBuf>,

    #[arg(
        long = "limit",
        help = "Keep only records matching the expression; repeatable, ANDed\nForms: field=regex (host, ipaddr, os_name) or @filename"
    )]
    pub limits: Vec<String>,

    #[arg(
        long = "exclude",
        help = "Drop records matching the expression; repeatable, any match drops\nForms: field=regex (host, ipaddr, os_name) or @filename"
    )]
    pub excludes: Vec<String>,

    #[arg(
        short = 'b',
        long,
        value_parser = clap::value_parser!(u16).range(1..=500),
        help = "Maximum concurrent device sessions (1-500)\nUnlimited when neither this flag nor the config sets a value"
    )]
    pub batch: Option<u16>,

    #[arg(short = 't', long, help = "Per-device operation timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(
        short = 'v',
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Back up device configurations",
        long_about = "Captures the running configuration of every inventory record and writes it to\n<configs_dir>/<host>.cfg. Credentials from the configuration file are tried in order;\nper-OS settings control paging and the capture command.\n\nExit codes: 0 (all saved), 1 (any failures)"
    )]
    Backup,

    #[command(
        about = "Verify device logins",
        long_about = "Attempts an SSH login on every inventory record, walking the configured credential\nlist in order. Reports the matched identity per device, or 'all credentials failed'\nwhen the device rejects every credential.\n\nExit codes: 0 (all verified), 1 (any failures)"
    )]
    Login,

    #[command(
        about = "Probe SSH reachability",
        long_about = "Opens a TCP connection to every inventory record's SSH port within a short budget.\nNo authentication is attempted; this separates unreachable devices from credential\nproblems.\n\nExit codes: 0 (all reachable), 1 (any unreachable)"
    )]
    Probe,

    #[command(
        about = "List the filtered inventory",
        long_about = "Prints the inventory after --limit/--exclude filtering, one device per line.\nUseful for checking filter expressions before a bulk run."
    )]
    Inventory {
        #[arg(long, help = "Only show per-platform device counts")]
        brief: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_range_is_enforced() {
        let err = Cli::try_parse_from(["netbak", "--batch", "0", "backup"]);
        assert!(err.is_err());

        let err = Cli::try_parse_from(["netbak", "--batch", "501", "backup"]);
        assert!(err.is_err());

        let cli = Cli::try_parse_from(["netbak", "--batch", "20", "backup"]).unwrap();
        assert_eq!(cli.batch, Some(20));
    }

    #[test]
    fn test_filters_are_repeatable() {
        let cli = Cli::try_parse_from([
            "netbak",
            "--limit",
            "os_name=ios",
            "--limit",
            "host=sw-.*",
            "--exclude",
            "host=lab-.*",
            "inventory",
        ])
        .unwrap();
        assert_eq!(cli.limits.len(), 2);
        assert_eq!(cli.excludes.len(), 1);
    }
}
