//! E2E suite entry point
//!
//! Runs the case catalogue and post-run cleanup. Without `--live` the
//! catalogue runs against the in-memory fake services, so a plain
//! `cargo test` stays offline.
//!
//! Live run: cargo test --package superhero-e2e --test suite -- --live

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use superhero_e2e::config::CleanupMode;
use superhero_e2e::fake::{FakeBehaviour, FakeServer};
use superhero_e2e::{E2eResult, SuiteConfig, SuiteKind, TestRunner};

#[derive(Parser, Debug)]
#[command(name = "superhero-e2e")]
#[command(about = "E2E suite for the superhero REST and company SOAP services")]
struct Args {
    /// Hit the real services instead of the in-memory fake
    #[arg(long)]
    live: bool,

    /// Make the fake reproduce the live services' known defects
    #[arg(long, conflicts_with = "live")]
    remote_like: bool,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the superhero service base URL
    #[arg(long)]
    rest_url: Option<String>,

    /// Override the SOAP endpoint URL
    #[arg(long)]
    soap_url: Option<String>,

    /// Override the SOAP templates directory
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Run only one service's cases
    #[arg(short, long, value_enum)]
    suite: Option<SuiteKind>,

    /// Run only the named case (parameterised variants included)
    #[arg(short, long)]
    name: Option<String>,

    /// Run cases concurrently
    #[arg(long)]
    parallel: bool,

    /// Cleanup strategy
    #[arg(long, value_enum)]
    cleanup_mode: Option<CleanupMode>,

    /// Skip post-run cleanup
    #[arg(long)]
    no_cleanup: bool,

    /// Treat known defects as failures
    #[arg(long)]
    strict: bool,

    /// Output directory for results
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = rt.block_on(async_main(args));

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

fn build_config(args: &Args) -> E2eResult<SuiteConfig> {
    let mut config = match &args.config {
        Some(path) => SuiteConfig::from_file(path)?,
        None => SuiteConfig::default(),
    };

    if let Some(url) = &args.rest_url {
        config.rest.base_url = url.clone();
    }
    if let Some(url) = &args.soap_url {
        config.soap.url = url.clone();
    }
    if let Some(dir) = &args.templates {
        config.soap.templates_dir = dir.clone();
    }
    if let Some(mode) = args.cleanup_mode {
        config.cleanup.mode = mode;
    }
    if args.no_cleanup {
        config.cleanup.enabled = false;
    }
    config.parallel |= args.parallel;

    if !args.live {
        // The fake answers instantly; no need to wait between retries
        config.retry.interval_ms = 0;
    }

    config.validate()?;
    Ok(config)
}

async fn async_main(args: Args) -> E2eResult<bool> {
    let config = build_config(&args)?;

    let runner = if args.live {
        info!("Running against {} and {}", config.rest.base_url, config.soap.url);
        TestRunner::new(config)?
    } else {
        let behaviour = if args.remote_like {
            FakeBehaviour::remote_like()
        } else {
            FakeBehaviour::default()
        };
        info!("Running against in-memory fake services");
        TestRunner::with_transport(config, Arc::new(FakeServer::new(behaviour)))
    };
    let runner = runner.with_output_dir(args.output.clone());

    let report = if let Some(name) = &args.name {
        runner.run_case(name).await?
    } else if let Some(suite) = args.suite {
        runner.run_suite(suite).await?
    } else {
        runner.run_all().await?
    };

    runner.write_results(&report)?;

    Ok(report.is_success(args.strict))
}
