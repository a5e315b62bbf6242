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

//! Domain-level outcomes of device operations.

/// What a device operation reported when it ran to completion.
///
/// `NoCredentials` is a negative business result, not an error: the device
/// answered, every configured credential was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpOutcome {
    /// The operation succeeded; the detail (matched login identity, saved
    /// path, probe note) ends up in the report.
    Passed(Option<String>),
    /// Every configured credential was rejected by the device.
    NoCredentials,
}

impl OpOutcome {
    pub fn passed(detail: impl Into<String>) -> Self {
        Self::Passed(Some(detail.into()))
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed(_))
    }
}
