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

//! Admission gate bounding concurrently in-flight device sessions.
//!
//! Opening too many simultaneous sessions against memory-constrained
//! devices or rate-limiting servers causes connection resets; capping
//! concurrency avoids self-inflicted failure storms while still
//! overlapping network latency across many hosts.

use anyhow::{bail, Result};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::errors::OpError;

/// How many sessions may be in flight at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionLimit {
    #[default]
    Unbounded,
    AtMost(NonZeroUsize),
}

impl SessionLimit {
    /// Translate a `--batch` style option; `None` and `0` mean unbounded.
    pub fn from_batch(batch: Option<usize>) -> Self {
        match batch.and_then(NonZeroUsize::new) {
            Some(n) => Self::AtMost(n),
            None => Self::Unbounded,
        }
    }
}

/// One unit of gate capacity, held for the lifetime of an operation.
///
/// Dropping the token returns the capacity on every exit path, including
/// panics and cancellation.
#[derive(Debug)]
pub struct AdmissionToken {
    _permit: Option<OwnedSemaphorePermit>,
}

#[derive(Debug, Default)]
pub struct AdmissionGate {
    permits: Option<Arc<Semaphore>>,
    issued: AtomicUsize,
}

impl AdmissionGate {
    pub fn new(limit: SessionLimit) -> Self {
        Self {
            permits: semaphore_for(limit),
            issued: AtomicUsize::new(0),
        }
    }

    /// Replace the session limit. Fails once any token has been issued:
    /// the limit is fixed for the lifetime of a run.
    pub fn reconfigure(&mut self, limit: SessionLimit) -> Result<()> {
        if self.issued.load(Ordering::SeqCst) > 0 {
            bail!("session limit cannot change after operations have been admitted");
        }
        self.permits = semaphore_for(limit);
        Ok(())
    }

    /// Wait until a unit of capacity is free and claim it.
    pub async fn admit(&self) -> Result<AdmissionToken, OpError> {
        let permit = match &self.permits {
            Some(semaphore) => Some(
                Arc::clone(semaphore)
                    .acquire_owned()
                    .await
                    .map_err(|e| OpError::other("Gate", format!("admission failed: {e}")))?,
            ),
            None => None,
        };
        self.issued.fetch_add(1, Ordering::SeqCst);
        Ok(AdmissionToken { _permit: permit })
    }

    /// Total number of tokens ever issued by this gate.
    pub fn tokens_issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

fn semaphore_for(limit: SessionLimit) -> Option<Arc<Semaphore>> {
    match limit {
        SessionLimit::Unbounded => None,
        SessionLimit::AtMost(n) => Some(Arc::new(Semaphore::new(n.get()))),
    }
}
