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

use owo_colors::OwoColorize;
use std::collections::BTreeMap;

use crate::inventory::Record;

/// List the (filtered) inventory.
pub fn list_inventory(records: &[Record], brief: bool) {
    if records.is_empty() {
        println!("{}", "No inventory records".dimmed());
        return;
    }

    let mut per_os: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *per_os.entry(record.os_name.as_str()).or_default() += 1;
    }

    println!(
        "\n{} {} ({} {})\n",
        "▶".cyan(),
        "Inventory".bold(),
        records.len().to_string().yellow(),
        if records.len() == 1 {
            "device"
        } else {
            "devices"
        }
    );

    if brief {
        for (os_name, count) in &per_os {
            println!("  {} {}: {}", "●".blue(), os_name.bold(), count);
        }
        println!();
        return;
    }

    for record in records {
        println!(
            "  {} {} {}",
            "●".blue(),
            record.host.bold(),
            format!("[{} @ {}]", record.os_name, record.target()).dimmed()
        );
    }
    println!();
}
