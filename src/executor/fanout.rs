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

//! Concurrent fan-out over the inventory with completion-order draining.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::task::{Id, JoinSet};

use crate::errors::OpError;
use crate::executor::gate::{AdmissionGate, SessionLimit};
use crate::inventory::Record;

/// One unit of remote work bound to a single inventory record.
pub type OpFuture<T> = Pin<Box<dyn Future<Output = Result<T, OpError>> + Send + 'static>>;

/// Dispatches operations through an admission gate and hands back their
/// completions as they arrive.
#[derive(Debug, Default)]
pub struct FanOut {
    gate: Arc<AdmissionGate>,
}

impl FanOut {
    pub fn new(limit: SessionLimit) -> Self {
        Self {
            gate: Arc::new(AdmissionGate::new(limit)),
        }
    }

    /// Change the session limit. Fails once any operation has been
    /// admitted or is currently in flight.
    pub fn set_limit(&mut self, limit: SessionLimit) -> anyhow::Result<()> {
        match Arc::get_mut(&mut self.gate) {
            Some(gate) => gate.reconfigure(limit),
            None => anyhow::bail!("session limit cannot change while operations are in flight"),
        }
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Start every operation and return the stream of completions.
    ///
    /// Each operation waits for gate admission immediately before its
    /// underlying work begins; the token is released when the operation
    /// finishes, whatever the outcome.
    pub fn drain<T>(&self, ops: Vec<(OpFuture<T>, Record)>) -> Completions<T>
    where
        T: Send + 'static,
    {
        let mut tasks = JoinSet::new();
        let mut records = HashMap::with_capacity(ops.len());

        for (op, record) in ops {
            let gate = Arc::clone(&self.gate);
            let handle = tasks.spawn(async move {
                let _token = gate.admit().await?;
                op.await
            });
            records.insert(handle.id(), record);
        }

        Completions { tasks, records }
    }
}

/// Finished operations paired with their originating records, yielded in
/// completion order. Finite and not restartable.
///
/// Dropping this before exhaustion aborts the remaining operations and
/// discards their results.
#[derive(Debug)]
pub struct Completions<T> {
    tasks: JoinSet<Result<T, OpError>>,
    records: HashMap<Id, Record>,
}

impl<T> Completions<T>
where
    T: Send + 'static,
{
    /// Operations not yet observed by the consumer.
    pub fn remaining(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Wait for the next operation to finish.
    ///
    /// A task that panicked is still yielded, its failure folded into
    /// [`OpError`], so every dispatched operation surfaces exactly once.
    pub async fn next(&mut self) -> Option<(Result<T, OpError>, Record)> {
        loop {
            match self.tasks.join_next_with_id().await? {
                Ok((id, outcome)) => {
                    if let Some(record) = self.records.remove(&id) {
                        return Some((outcome, record));
                    }
                }
                Err(join_err) => {
                    let id = join_err.id();
                    match self.records.remove(&id) {
                        Some(record) => {
                            return Some((Err(OpError::from_join(join_err)), record));
                        }
                        None => {
                            tracing::error!("task {id} finished without a matching record: {join_err}");
                        }
                    }
                }
            }
        }
    }
}
