//! Post-run removal of heroes created by the suite
//!
//! ```text
//! Idle ──► Scanning ──► Deleting(n) ──► Verifying ──► Done
//!   │          (forced only)   ▲
//!   └──────────────────────────┘ (registry mode)
//! ```
//!
//! The remote DELETE only takes effect every few calls, so forced mode
//! repeats it for each listed hero that carries the marker or was recorded
//! in the registry. Every individual call must still report success; the
//! first failed call aborts cleanup.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::{CleanupConfig, CleanupMode};
use crate::error::{E2eError, E2eResult};
use crate::hero::Hero;
use crate::registry::CreatedRegistry;
use crate::rest::SuperheroClient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum CleanupPhase {
    Idle,
    Scanning,
    /// `remaining` counts the hero being deleted and those after it
    Deleting { remaining: usize },
    Verifying,
    Done,
}

impl CleanupPhase {
    fn can_advance_to(&self, next: &CleanupPhase) -> bool {
        use CleanupPhase::*;
        match (self, next) {
            (Idle, Scanning) | (Idle, Deleting { .. }) | (Idle, Verifying) => true,
            (Scanning, Deleting { .. }) | (Scanning, Verifying) => true,
            (Deleting { remaining: a }, Deleting { remaining: b }) => b < a,
            (Deleting { .. }, Verifying) => true,
            (Verifying, Done) => true,
            _ => false,
        }
    }
}

/// What a finished cleanup did
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupReport {
    pub mode: CleanupMode,
    pub phases: Vec<CleanupPhase>,
    /// Hero ids cleanup tried to delete
    pub targets: Vec<i64>,
    pub delete_calls: u32,
}

pub struct SuiteCleanup {
    client: SuperheroClient,
    registry: CreatedRegistry,
    prefix: String,
    config: CleanupConfig,
    phase: CleanupPhase,
    report: CleanupReport,
}

impl SuiteCleanup {
    pub fn new(
        client: SuperheroClient,
        registry: CreatedRegistry,
        prefix: &str,
        config: CleanupConfig,
    ) -> Self {
        Self {
            client,
            registry,
            prefix: prefix.to_string(),
            report: CleanupReport {
                mode: config.mode,
                phases: vec![CleanupPhase::Idle],
                targets: Vec::new(),
                delete_calls: 0,
            },
            config,
            phase: CleanupPhase::Idle,
        }
    }

    pub fn phase(&self) -> &CleanupPhase {
        &self.phase
    }

    fn advance(&mut self, next: CleanupPhase) -> E2eResult<()> {
        if !self.phase.can_advance_to(&next) {
            return Err(E2eError::Cleanup(format!(
                "invalid transition {:?} -> {:?}",
                self.phase, next
            )));
        }
        debug!("Cleanup {:?} -> {:?}", self.phase, next);
        self.report.phases.push(next.clone());
        self.phase = next;
        Ok(())
    }

    /// Drive the machine to `Done`, or fail at the first broken step
    pub async fn run(mut self) -> E2eResult<CleanupReport> {
        let result = self.drive().await;
        match result {
            Ok(()) => {
                info!(
                    "Cleanup done: {} target(s), {} delete call(s)",
                    self.report.targets.len(),
                    self.report.delete_calls
                );
                Ok(self.report)
            }
            Err(e) => {
                error!("Cleanup failed in {:?}: {}", self.phase, e);
                Err(e)
            }
        }
    }

    async fn drive(&mut self) -> E2eResult<()> {
        let registered = self.registry.snapshot();
        let (targets, attempts) = match self.config.mode {
            CleanupMode::Forced => {
                self.advance(CleanupPhase::Scanning)?;
                let owned = self.owned_heroes(&registered).await?;
                (owned, self.config.forced_attempts)
            }
            CleanupMode::Registry => (registered.clone(), 1),
        };

        info!(
            "Cleanup ({:?}): deleting {} hero(es), {} call(s) each",
            self.config.mode,
            targets.len(),
            attempts
        );
        self.report.targets = targets.clone();

        for (index, id) in targets.iter().enumerate() {
            self.advance(CleanupPhase::Deleting {
                remaining: targets.len() - index,
            })?;
            self.delete_repeatedly(*id, attempts).await?;
        }

        self.advance(CleanupPhase::Verifying)?;
        let leftovers = self.owned_heroes(&registered).await?;
        if !leftovers.is_empty() {
            return Err(E2eError::Cleanup(format!(
                "{} hero(es) still carry '{}' or were created by this run: {:?}",
                leftovers.len(),
                self.prefix,
                leftovers
            )));
        }

        self.advance(CleanupPhase::Done)
    }

    /// Listed heroes carrying the marker or recorded by this run, in list order
    async fn owned_heroes(&self, registered: &[i64]) -> E2eResult<Vec<i64>> {
        Ok(self
            .fetch_heroes()
            .await?
            .iter()
            .filter(|h| h.is_marked(&self.prefix) || registered.contains(&h.id))
            .map(|h| h.id)
            .collect())
    }

    async fn fetch_heroes(&self) -> E2eResult<Vec<Hero>> {
        let response = self.client.list().await?;
        if !response.is_success() {
            return Err(E2eError::Cleanup(format!(
                "listing heroes failed with status {}",
                response.status
            )));
        }
        response.json()
    }

    async fn delete_repeatedly(&mut self, id: i64, attempts: u32) -> E2eResult<()> {
        for attempt in 1..=attempts {
            let response = self.client.delete(id).await?;
            self.report.delete_calls += 1;
            if !response.is_success() {
                return Err(E2eError::Cleanup(format!(
                    "delete of hero {} failed on call {}/{} with status {}",
                    id, attempt, attempts, response.status
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forced_path_transitions_are_allowed() {
        let path = [
            CleanupPhase::Idle,
            CleanupPhase::Scanning,
            CleanupPhase::Deleting { remaining: 2 },
            CleanupPhase::Deleting { remaining: 1 },
            CleanupPhase::Verifying,
            CleanupPhase::Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(&pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn backwards_transitions_are_rejected() {
        assert!(!CleanupPhase::Done.can_advance_to(&CleanupPhase::Idle));
        assert!(!CleanupPhase::Verifying.can_advance_to(&CleanupPhase::Scanning));
        assert!(!CleanupPhase::Deleting { remaining: 1 }
            .can_advance_to(&CleanupPhase::Deleting { remaining: 1 }));
        assert!(!CleanupPhase::Idle.can_advance_to(&CleanupPhase::Done));
    }

    #[test]
    fn phases_serialize_with_tag() {
        let json = serde_json::to_value(CleanupPhase::Deleting { remaining: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"phase": "deleting", "remaining": 3}));
    }
}
