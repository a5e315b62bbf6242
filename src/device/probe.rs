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

//! TCP reachability probe.

use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::errors::OpError;
use crate::executor::OpOutcome;

/// Try to open a TCP connection within the budget. A refused or
/// unreachable target surfaces the OS error; an exhausted budget surfaces
/// a timeout.
pub async fn probe_device(target: String, port: u16, budget: Duration) -> Result<OpOutcome, OpError> {
    match timeout(budget, TcpStream::connect((target.as_str(), port))).await {
        Ok(Ok(_stream)) => Ok(OpOutcome::passed(format!("port {port} reachable"))),
        Ok(Err(err)) => Err(OpError::Io(err)),
        Err(_) => Err(OpError::timeout()),
    }
}
