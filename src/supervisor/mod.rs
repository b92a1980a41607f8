//! Background batch runs with observable completion.
//!
//! [`RunSupervisor::launch`] spawns a run and returns immediately. Each run publishes
//! its [`RunStatus`] through a `watch` channel, so callers can poll or await it.


use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::batch::{BatchRunner, RunReport, RunScope, TierSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunStatus {
    Running {
        scope: RunScope,
        started_at: DateTime<Utc>,
    },
    Completed {
        report: RunReport,
    },
    /// The run aborted (city list unavailable) or panicked.
    Failed {
        error: String,
    },
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running { .. })
    }
}

/// Finished runs kept for status queries before the oldest are dropped.
pub const MAX_RETAINED_RUNS: usize = 256;

type StatusSender = Arc<watch::Sender<RunStatus>>;

/// Status channels in launch order.
#[derive(Default)]
struct RunTable {
    statuses: HashMap<RunId, StatusSender>,
    order: VecDeque<RunId>,
}

impl RunTable {
    fn insert(&mut self, run_id: RunId, status_tx: StatusSender) {
        self.statuses.insert(run_id, status_tx);
        self.order.push_back(run_id);
    }

    fn get(&self, run_id: &RunId) -> Option<&StatusSender> {
        self.statuses.get(run_id)
    }

    fn len(&self) -> usize {
        self.statuses.len()
    }

    /// Drops the oldest terminal runs until at most `limit` remain.
    ///
    /// Running entries are never dropped, so the table can exceed `limit`
    /// while that many runs are in flight.
    fn evict_terminal(&mut self, limit: usize) -> usize {
        let mut excess = self.statuses.len().saturating_sub(limit);
        let mut evicted = 0;
        let RunTable { statuses, order } = self;

        order.retain(|run_id| {
            if excess == 0 {
                return true;
            }
            let terminal = statuses
                .get(run_id)
                .is_none_or(|tx| tx.borrow().is_terminal());
            if terminal {
                statuses.remove(run_id);
                excess -= 1;
                evicted += 1;
            }
            !terminal
        });
        evicted
    }
}

/// Spawns batch runs and tracks their status by [`RunId`].
#[derive(Clone)]
pub struct RunSupervisor {
    runner: Arc<BatchRunner>,
    runs: Arc<RwLock<RunTable>>,
    retention: usize,
}

impl RunSupervisor {
    pub fn new(runner: Arc<BatchRunner>) -> Self {
        Self {
            runner,
            runs: Arc::new(RwLock::new(RunTable::default())),
            retention: MAX_RETAINED_RUNS,
        }
    }

    /// Keeps at most `max_runs` finished runs (at least one).
    pub fn with_retention(mut self, max_runs: usize) -> Self {
        self.retention = max_runs.max(1);
        self
    }

    pub fn runner(&self) -> &Arc<BatchRunner> {
        &self.runner
    }

    /// Starts `scope` in the background.
    pub fn launch(&self, scope: RunScope) -> RunId {
        self.launch_with_tiers(scope, None)
    }

    /// Starts `scope` in the background, overriding the configured tiers when given.
    pub fn launch_with_tiers(&self, scope: RunScope, tiers: Option<TierSet>) -> RunId {
        self.spawn_run(scope, tiers).0
    }

    fn spawn_run(
        &self,
        scope: RunScope,
        tiers: Option<TierSet>,
    ) -> (RunId, watch::Receiver<RunStatus>) {
        let run_id = RunId::new();
        let (status_tx, status_rx) = watch::channel(RunStatus::Running {
            scope,
            started_at: Utc::now(),
        });
        let status_tx = Arc::new(status_tx);
        {
            let mut runs = self.runs.write();
            let evicted = runs.evict_terminal(self.retention - 1);
            if evicted > 0 {
                debug!(evicted, retained = runs.len(), "dropped finished runs");
            }
            runs.insert(run_id, status_tx.clone());
        }

        let runner = self.runner.clone();
        let tiers = tiers.unwrap_or(runner.config().tiers);
        let task = tokio::spawn(async move { runner.run_tiers(scope, tiers).await });

        tokio::spawn(async move {
            let status = match task.await {
                Ok(Ok(report)) => {
                    info!(%run_id, success = report.success(), "run completed");
                    RunStatus::Completed { report }
                }
                Ok(Err(err)) => {
                    error!(%run_id, error = %err, "run failed");
                    RunStatus::Failed {
                        error: err.to_string(),
                    }
                }
                Err(join_err) => {
                    error!(%run_id, error = %join_err, "run task aborted");
                    let error = if join_err.is_panic() {
                        "run panicked".to_string()
                    } else {
                        "run cancelled".to_string()
                    };
                    RunStatus::Failed { error }
                }
            };
            status_tx.send_replace(status);
        });

        info!(%run_id, %scope, "run launched");
        (run_id, status_rx)
    }

    /// Current status, or `None` for an unknown id.
    pub fn status(&self, run_id: RunId) -> Option<RunStatus> {
        self.runs
            .read()
            .get(&run_id)
            .map(|tx| tx.borrow().clone())
    }

    /// Waits for the run to reach a terminal status.
    pub async fn wait(&self, run_id: RunId) -> Option<RunStatus> {
        let status_rx = self.runs.read().get(&run_id)?.subscribe();
        Some(wait_terminal(status_rx).await)
    }

    /// Launches `scope` and waits for it to finish.
    pub async fn run_to_completion(
        &self,
        scope: RunScope,
        tiers: Option<TierSet>,
    ) -> (RunId, RunStatus) {
        let (run_id, status_rx) = self.spawn_run(scope, tiers);
        (run_id, wait_terminal(status_rx).await)
    }

    /// Tracked runs, oldest first.
    pub fn run_ids(&self) -> Vec<RunId> {
        self.runs.read().order.iter().copied().collect()
    }
}

async fn wait_terminal(mut status_rx: watch::Receiver<RunStatus>) -> RunStatus {
    if let Ok(status) = status_rx.wait_for(RunStatus::is_terminal).await {
        return status.clone();
    }
    status_rx.borrow().clone()
}
