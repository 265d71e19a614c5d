//! Main test runner that orchestrates cases and post-run cleanup

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::cases::{catalogue, CaseContext, SuiteKind, TestCase};
use crate::cleanup::{CleanupReport, SuiteCleanup};
use crate::config::SuiteConfig;
use crate::error::{E2eError, E2eResult};
use crate::transport::{ReqwestTransport, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOutcome {
    Passed,
    Failed,
    /// Failed, and the failure matches a documented remote defect
    KnownDefect,
}

/// Result of running a single case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub name: String,
    pub suite: SuiteKind,
    pub outcome: CaseOutcome,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub known_defect: Option<String>,
}

/// Result of running a selection of cases plus cleanup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub known_defects: usize,
    pub duration_ms: u64,
    pub results: Vec<CaseResult>,
    pub cleanup: Option<CleanupReport>,
    pub cleanup_error: Option<String>,
}

impl SuiteReport {
    /// Whether the run counts as green; `strict` also rejects known defects
    pub fn is_success(&self, strict: bool) -> bool {
        self.failed == 0 && self.cleanup_error.is_none() && (!strict || self.known_defects == 0)
    }

    pub fn result(&self, name: &str) -> Option<&CaseResult> {
        self.results.iter().find(|r| r.name == name)
    }
}

/// Main E2E test runner
pub struct TestRunner {
    config: SuiteConfig,
    context: CaseContext,
    cases: Vec<TestCase>,
    output_dir: PathBuf,
}

impl TestRunner {
    /// Runner talking to the live services over HTTP
    pub fn new(config: SuiteConfig) -> E2eResult<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Runner over an arbitrary transport, with the full catalogue
    pub fn with_transport(config: SuiteConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            context: CaseContext::new(config.clone(), transport),
            config,
            cases: catalogue(),
            output_dir: PathBuf::from("test-results"),
        }
    }

    /// Replace the case catalogue
    pub fn with_cases(mut self, cases: Vec<TestCase>) -> Self {
        self.cases = cases;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn context(&self) -> &CaseContext {
        &self.context
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Run every case
    pub async fn run_all(&self) -> E2eResult<SuiteReport> {
        let cases = self.cases.clone();
        self.run_cases(&cases).await
    }

    /// Run the cases of one service
    pub async fn run_suite(&self, suite: SuiteKind) -> E2eResult<SuiteReport> {
        let cases: Vec<TestCase> = self
            .cases
            .iter()
            .filter(|c| c.suite == suite)
            .cloned()
            .collect();
        self.run_cases(&cases).await
    }

    /// Run the cases whose name equals `name` or starts with `name[`
    pub async fn run_case(&self, name: &str) -> E2eResult<SuiteReport> {
        let variants = format!("{name}[");
        let cases: Vec<TestCase> = self
            .cases
            .iter()
            .filter(|c| c.name == name || c.name.starts_with(&variants))
            .cloned()
            .collect();
        if cases.is_empty() {
            return Err(E2eError::CaseNotFound(name.to_string()));
        }
        self.run_cases(&cases).await
    }

    /// Run a list of cases, then clean up if any REST case ran
    pub async fn run_cases(&self, cases: &[TestCase]) -> E2eResult<SuiteReport> {
        let start = Instant::now();
        info!(
            "Running {} case(s){}...",
            cases.len(),
            if self.config.parallel { " in parallel" } else { "" }
        );

        let results = if self.config.parallel {
            join_all(cases.iter().map(|case| self.run_one(case))).await
        } else {
            let mut results = Vec::with_capacity(cases.len());
            for case in cases {
                results.push(self.run_one(case).await);
            }
            results
        };

        let (cleanup, cleanup_error) = if self.config.cleanup.enabled
            && cases.iter().any(|c| c.suite == SuiteKind::Rest)
        {
            match self.cleanup().await {
                Ok(report) => (Some(report), None),
                Err(e) => (None, Some(e.to_string())),
            }
        } else {
            debug!("Skipping cleanup");
            (None, None)
        };

        let count = |outcome| results.iter().filter(|r| r.outcome == outcome).count();
        let report = SuiteReport {
            total: results.len(),
            passed: count(CaseOutcome::Passed),
            failed: count(CaseOutcome::Failed),
            known_defects: count(CaseOutcome::KnownDefect),
            duration_ms: start.elapsed().as_millis() as u64,
            results,
            cleanup,
            cleanup_error,
        };

        info!("");
        info!(
            "Test Results: {} passed, {} failed, {} known defect(s) ({} ms)",
            report.passed, report.failed, report.known_defects, report.duration_ms
        );
        if let Some(e) = &report.cleanup_error {
            error!("Cleanup: {}", e);
        }

        Ok(report)
    }

    async fn run_one(&self, case: &TestCase) -> CaseResult {
        let start = Instant::now();
        debug!("Running case: {}", case.name);

        let result = case.run(self.context.clone()).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let (outcome, error) = match result {
            Ok(()) => {
                info!("✓ {} ({} ms)", case.name, duration_ms);
                if case.known_defect.is_some() {
                    info!("  known defect did not reproduce for {}", case.name);
                }
                (CaseOutcome::Passed, None)
            }
            Err(e) => match case.known_defect {
                Some(note) => {
                    warn!("✗ {} - {} (known defect: {})", case.name, e, note);
                    (CaseOutcome::KnownDefect, Some(e.to_string()))
                }
                None => {
                    error!("✗ {} - {}", case.name, e);
                    (CaseOutcome::Failed, Some(e.to_string()))
                }
            },
        };

        CaseResult {
            name: case.name.clone(),
            suite: case.suite,
            outcome,
            duration_ms,
            error,
            known_defect: case.known_defect.map(str::to_string),
        }
    }

    /// Run the configured cleanup against the REST service
    pub async fn cleanup(&self) -> E2eResult<CleanupReport> {
        SuiteCleanup::new(
            self.context.heroes.clone(),
            self.context.registry.clone(),
            self.context.prefix(),
            self.config.cleanup.clone(),
        )
        .run()
        .await
    }

    /// Write the report as JSON into the output directory
    pub fn write_results(&self, report: &SuiteReport) -> E2eResult<PathBuf> {
        write_report(&self.output_dir, report)
    }
}

pub fn write_report(dir: &Path, report: &SuiteReport) -> E2eResult<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let path = dir.join("test-results.json");
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json)?;

    info!("Results written to: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeServer;

    fn report(failed: usize, known: usize, cleanup_error: Option<&str>) -> SuiteReport {
        SuiteReport {
            total: failed + known,
            passed: 0,
            failed,
            known_defects: known,
            duration_ms: 0,
            results: Vec::new(),
            cleanup: None,
            cleanup_error: cleanup_error.map(str::to_string),
        }
    }

    #[test]
    fn success_rules() {
        assert!(report(0, 2, None).is_success(false));
        assert!(!report(0, 2, None).is_success(true));
        assert!(!report(1, 0, None).is_success(false));
        assert!(!report(0, 0, Some("leftover")).is_success(false));
    }

    #[tokio::test]
    async fn unknown_case_is_reported() {
        let runner = TestRunner::with_transport(SuiteConfig::default(), Arc::new(FakeServer::default()));
        let err = runner.run_case("rest_99_nope").await.unwrap_err();
        assert!(matches!(err, E2eError::CaseNotFound(name) if name == "rest_99_nope"));
    }

    #[test]
    fn writes_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(dir.path(), &report(0, 1, None)).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written["known_defects"], 1);
        assert!(written["cleanup"].is_null());
    }
}
