//! Generation-tagged fill of role diffs
//!
//! The person prefetch is spawned before diffing starts. Role diffs are
//! handed out loading, and an [`AclBackfill`] later fills them with emails
//! once the prefetch settles. A backfill only touches its rows while its
//! generation is still the engine's current one, so a slow prefetch from
//! an older computation cannot overwrite a newer one.

use audit_context::{ContextResult, PersonCache};
use audit_diff::PendingRoleDiff;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// In-flight person prefetch
pub(crate) type PrefetchHandle = JoinHandle<ContextResult<usize>>;

/// How a backfill ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackfillOutcome {
    /// Rows were filled with emails
    Applied {
        /// Rows filled
        rows: usize,
    },
    /// A newer computation started; rows were left alone
    Superseded {
        /// Generation of this backfill
        generation: u64,
        /// Generation current when the prefetch settled
        current: u64,
    },
    /// Prefetch failed, timed out or was cancelled; rows carry the reason
    Failed {
        /// Rows marked failed
        rows: usize,
        /// Why loading stopped
        reason: String,
    },
}

impl BackfillOutcome {
    /// Whether emails were applied
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Pending email fill for one computation
///
/// Dropping it detaches the prefetch, which still warms the person cache.
#[derive(Debug)]
pub struct AclBackfill {
    generation: u64,
    current: Arc<AtomicU64>,
    pending: Vec<PendingRoleDiff>,
    people: Arc<PersonCache>,
    placeholder: String,
    timeout: Duration,
    prefetch: Option<PrefetchHandle>,
}

impl AclBackfill {
    pub(crate) fn new(
        generation: u64,
        current: Arc<AtomicU64>,
        pending: Vec<PendingRoleDiff>,
        people: Arc<PersonCache>,
        placeholder: String,
        timeout: Duration,
        prefetch: Option<PrefetchHandle>,
    ) -> Self {
        Self {
            generation,
            current,
            pending,
            people,
            placeholder,
            timeout,
            prefetch,
        }
    }

    /// Generation this backfill belongs to
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of role diffs waiting for emails
    #[inline]
    #[must_use]
    pub fn pending_rows(&self) -> usize {
        self.pending.len()
    }

    /// Whether a person fetch is still attached
    #[inline]
    #[must_use]
    pub fn has_prefetch(&self) -> bool {
        self.prefetch.is_some()
    }

    /// Wait for the prefetch and fill the rows
    ///
    /// The wait is bounded by the configured prefetch timeout. A timed-out
    /// fetch keeps running in the background.
    pub async fn run(self) -> BackfillOutcome {
        let fetched = match self.prefetch {
            None => Ok(0),
            Some(mut handle) => match tokio::time::timeout(self.timeout, &mut handle).await {
                Ok(Ok(Ok(loaded))) => Ok(loaded),
                Ok(Ok(Err(e))) => Err(format!("person prefetch failed: {e}")),
                Ok(Err(e)) => Err(format!("person prefetch aborted: {e}")),
                Err(_) => Err(format!(
                    "person prefetch timed out after {}ms",
                    self.timeout.as_millis()
                )),
            },
        };

        let current = self.current.load(Ordering::SeqCst);
        if current != self.generation {
            tracing::info!(
                "Discarding backfill of generation {} (current {})",
                self.generation,
                current
            );
            return BackfillOutcome::Superseded {
                generation: self.generation,
                current,
            };
        }

        let rows = self.pending.len();
        match fetched {
            Ok(loaded) => {
                for row in &self.pending {
                    row.fill(&self.people, &self.placeholder);
                }
                tracing::debug!(
                    "Generation {}: filled {} role diffs after loading {} people",
                    self.generation,
                    rows,
                    loaded
                );
                BackfillOutcome::Applied { rows }
            }
            Err(reason) => {
                tracing::warn!("Generation {}: {}", self.generation, reason);
                for row in &self.pending {
                    row.fail(&reason);
                }
                BackfillOutcome::Failed { rows, reason }
            }
        }
    }

    /// Abort the prefetch and mark every row failed
    pub fn cancel(self) -> BackfillOutcome {
        if let Some(handle) = &self.prefetch {
            handle.abort();
        }
        let reason = "person prefetch cancelled".to_string();
        for row in &self.pending {
            row.fail(&reason);
        }
        tracing::debug!("Generation {} cancelled", self.generation);
        BackfillOutcome::Failed {
            rows: self.pending.len(),
            reason,
        }
    }
}
