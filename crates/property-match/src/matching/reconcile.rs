use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::OrganizationId;
use super::notify::DispatchSummary;
use super::pipeline::{CandidateScope, MatchingError, MatchingPipeline};
use super::repository::MatchStore;
use crate::config::RetentionScope;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkMatchReport {
    pub organization_id: OrganizationId,
    pub purged: usize,
    pub matches_created: usize,
    pub duration_seconds: f64,
    pub matches_per_second: f64,
    pub notifications: DispatchSummary,
}

/// Retention sweep followed by a full-catalog pipeline pass.
pub struct BulkReconciler {
    pipeline: Arc<MatchingPipeline>,
    store: Arc<dyn MatchStore>,
    retention_days: i64,
    scope: RetentionScope,
}

impl BulkReconciler {
    pub fn new(
        pipeline: Arc<MatchingPipeline>,
        store: Arc<dyn MatchStore>,
        retention_days: i64,
        scope: RetentionScope,
    ) -> Self {
        Self {
            pipeline,
            store,
            retention_days,
            scope,
        }
    }

    pub fn bulk_match(
        &self,
        organization_id: &OrganizationId,
        now: DateTime<Utc>,
    ) -> Result<BulkMatchReport, MatchingError> {
        let started = Instant::now();

        let cutoff = Duration::try_days(self.retention_days)
            .and_then(|retention| now.checked_sub_signed(retention))
            .ok_or(MatchingError::WindowOutOfRange {
                setting: "retention_days",
                value: self.retention_days,
            })?;
        let sweep_scope = match self.scope {
            RetentionScope::Global => None,
            RetentionScope::Organization => Some(organization_id),
        };
        let purged = self.store.delete_older_than(cutoff, sweep_scope)?;

        let run = self
            .pipeline
            .run(organization_id, &CandidateScope::FullCatalog, now)?;

        let duration_seconds = started.elapsed().as_secs_f64();
        let matches_per_second = throughput(run.matches_created, duration_seconds);

        info!(
            %organization_id,
            purged,
            matches = run.matches_created,
            duration_seconds,
            matches_per_second,
            "bulk reconciliation finished"
        );

        Ok(BulkMatchReport {
            organization_id: organization_id.clone(),
            purged,
            matches_created: run.matches_created,
            duration_seconds,
            matches_per_second,
            notifications: run.notifications,
        })
    }
}

fn throughput(matches: usize, seconds: f64) -> f64 {
    if seconds > 0.0 {
        matches as f64 / seconds
    } else {
        0.0
    }
}
