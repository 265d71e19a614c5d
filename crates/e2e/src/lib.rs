//! Superhero / Company E2E Test Suite
//!
//! This crate drives the remote superhero REST service and company SOAP
//! service through their CRUD flows:
//! - Runs an ordered catalogue of REST and SOAP cases
//! - Retries reads the service only makes visible after a delay
//! - Records every hero it creates and sweeps them away afterwards
//! - Reports cases failing on documented remote defects separately
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── run_all() / run_suite() / run_case()                 │
//! │    ├── TestCase::run(CaseContext) -> E2eResult<()>          │
//! │    │     ├── SuperheroClient ── Transport (reqwest | fake)  │
//! │    │     ├── SoapClient + SoapTemplate + FieldExtractor     │
//! │    │     ├── retry(op, interval, attempts)                  │
//! │    │     └── CreatedRegistry::record(id)                    │
//! │    └── SuiteCleanup::run()                                  │
//! │          Idle → Scanning → Deleting(n) → Verifying → Done   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod cases;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod fake;
pub mod hero;
pub mod registry;
pub mod rest;
pub mod retry;
pub mod runner;
pub mod soap;
pub mod transport;

pub use cases::{SuiteKind, TestCase};
pub use config::SuiteConfig;
pub use error::{E2eError, E2eResult};
pub use runner::TestRunner;
