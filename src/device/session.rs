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

//! SSH session driver for network devices.
//!
//! Network devices rarely publish stable host keys across reboots and RMAs,
//! so host key checking is not enforced here; access control is the
//! credential list tried in order.

use secrecy::ExposeSecret;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use russh::client::{self, Config, Handle, Handler};
use russh::ChannelMsg;

use crate::config::{Credential, OsSpec};
use crate::errors::OpError;
use crate::executor::OpOutcome;
use crate::inventory::Record;

/// Everything a device operation needs beyond its record.
#[derive(Debug, Clone)]
pub struct DeviceOpts {
    pub port: u16,
    /// Budget for the whole operation, connect included.
    pub timeout: Duration,
    pub credentials: Arc<Vec<Credential>>,
    pub os: OsSpec,
}

#[derive(Debug, Clone)]
struct DeviceHandler;

impl Handler for DeviceHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh::keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// An authenticated session plus the identity that matched.
struct DeviceSession {
    handle: Handle<DeviceHandler>,
    username: String,
}

impl DeviceSession {
    /// Run one command and collect its full output.
    async fn run(&mut self, command: &str) -> Result<String, OpError> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(OpError::from_ssh)?;
        channel
            .exec(true, command)
            .await
            .map_err(OpError::from_ssh)?;

        let mut output = Vec::new();
        while let Some(msg) = channel.wait().await {
            // Devices do not reliably send an exit status; read until the
            // channel closes.
            if let ChannelMsg::Data { ref data } = msg {
                output.extend_from_slice(data);
            }
        }

        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    async fn close(self) {
        let _ = self
            .handle
            .disconnect(russh::Disconnect::ByApplication, "", "")
            .await;
    }
}

/// Connect and walk the credential list in order. `Ok(None)` means the
/// device answered but rejected every credential.
async fn open_session(
    record: &Record,
    opts: &DeviceOpts,
) -> Result<Option<DeviceSession>, OpError> {
    let config = Arc::new(Config::default());

    let mut handle = client::connect(config, (record.target(), opts.port), DeviceHandler)
        .await
        .map_err(OpError::from_ssh)?;

    for cred in opts.credentials.iter() {
        let auth = handle
            .authenticate_password(&cred.username, cred.password.expose_secret())
            .await
            .map_err(OpError::from_ssh)?;

        if auth.success() {
            tracing::debug!(host = %record.host, user = %cred.username, "login ok");
            return Ok(Some(DeviceSession {
                handle,
                username: cred.username.clone(),
            }));
        }
        tracing::debug!(host = %record.host, user = %cred.username, "credential rejected");
    }

    Ok(None)
}

/// Verify that at least one configured credential opens a session.
pub async fn login_device(record: Record, opts: DeviceOpts) -> Result<OpOutcome, OpError> {
    let attempt = async {
        match open_session(&record, &opts).await? {
            Some(session) => {
                let username = session.username.clone();
                session.close().await;
                Ok(OpOutcome::passed(username))
            }
            None => Ok(OpOutcome::NoCredentials),
        }
    };

    match timeout(opts.timeout, attempt).await {
        Ok(outcome) => outcome,
        Err(_) => Err(OpError::timeout()),
    }
}

/// Capture the device configuration into `<configs_dir>/<host>.cfg`.
pub async fn backup_config(
    record: Record,
    opts: DeviceOpts,
    configs_dir: PathBuf,
) -> Result<OpOutcome, OpError> {
    let attempt = async {
        let Some(mut session) = open_session(&record, &opts).await? else {
            return Ok(OpOutcome::NoCredentials);
        };

        for command in &opts.os.pre_commands {
            session.run(command).await?;
        }

        let show = opts
            .os
            .show_config
            .as_deref()
            .unwrap_or("show running-config");
        let content = session.run(show).await?;
        session.close().await;

        let path = configs_dir.join(format!("{}.cfg", record.host));
        tokio::fs::write(&path, content.as_bytes())
            .await
            .map_err(OpError::Io)?;

        tracing::debug!(host = %record.host, path = %path.display(), "config saved");
        Ok(OpOutcome::passed(path.display().to_string()))
    };

    match timeout(opts.timeout, attempt).await {
        Ok(outcome) => outcome,
        Err(_) => Err(OpError::timeout()),
    }
}
