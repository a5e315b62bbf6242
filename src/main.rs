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

use anyhow::{bail, Result};
use clap::Parser;

use netbak::{
    cli::{Cli, Commands},
    commands::{
        backup::backup_configs, inventory::list_inventory, login::verify_logins,
        probe::probe_devices,
    },
    config::Config,
    executor::SessionLimit,
    filtering::{FilterMode, InventoryFilter},
    inventory::{self, Record},
    utils::init_logging,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = Config::load(&cli.config).await?;
    let records = load_filtered_inventory(&cli, &config).await?;
    let limit = SessionLimit::from_batch(config.batch(cli.batch.map(usize::from)));

    let report = match &cli.command {
        Commands::Backup => backup_configs(&records, &config, limit, cli.timeout).await?,
        Commands::Login => verify_logins(&records, &config, limit, cli.timeout).await?,
        Commands::Probe => probe_devices(&records, &config, limit, cli.timeout).await?,
        Commands::Inventory { brief } => {
            list_inventory(&records, *brief);
            return Ok(());
        }
    };

    if report.fail_count() > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Load the inventory and apply `--limit`/`--exclude` filters. An empty
/// result is a hard error; nothing is dispatched for an empty run.
async fn load_filtered_inventory(cli: &Cli, config: &Config) -> Result<Vec<Record>> {
    let path = config.inventory_path(cli.inventory.as_deref());
    let mut records = inventory::load(&path).await?;

    let limit = InventoryFilter::parse(FilterMode::Limit, &cli.limits)?;
    let exclude = InventoryFilter::parse(FilterMode::Exclude, &cli.excludes)?;
    records.retain(|rec| limit.allows(rec) && exclude.allows(rec));

    if records.is_empty() {
        bail!(
            "no inventory records remain after filtering; \
             check the inventory file at {path:?} and any --limit/--exclude expressions"
        );
    }

    tracing::info!("inventory: {} records selected", records.len());
    Ok(records)
}
