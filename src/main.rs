use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use engine_audit::audit::{AuditRunner, Matrix};
use engine_audit::config::AuditConfig;

/// Default log filter when `RUST_LOG` is not set
const DEFAULT_LOG_FILTER: &str = "engine_audit=info";

#[derive(Parser)]
#[command(name = "engine-audit")]
#[command(version, about = "Reports engine pins that have fallen behind upstream")]
struct Cli {
    /// Directory containing one sub-directory per engine
    #[arg(long, env = "ENGINES_DIR")]
    engines_dir: Option<PathBuf>,

    /// Token for the GitHub API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Number of engines checked at the same time
    #[arg(long)]
    concurrency: Option<usize>,

    /// JSON config file; command line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Also write the matrix JSON to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn audit_config(&self) -> anyhow::Result<AuditConfig> {
        let mut config = match &self.config {
            Some(path) => AuditConfig::load(path)?,
            None => AuditConfig::default(),
        };

        if let Some(engines_dir) = &self.engines_dir {
            config.engines_dir = engines_dir.clone();
        }
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.log_file.as_deref())?;
    let config = cli.audit_config()?;

    let issues = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(AuditRunner::new(&config).run())?;

    let matrix = Matrix::new(issues);
    let json = matrix.to_json()?;
    info!("Found {} issues: {}", matrix.include.len(), json);

    emit(&json, cli.output.as_deref())
}

/// Prints the matrix and hands it to GitHub Actions when running there
fn emit(json: &str, output: Option<&Path>) -> anyhow::Result<()> {
    println!("{json}");

    if let Some(path) = output {
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    if let Some(path) = std::env::var_os("GITHUB_OUTPUT") {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context("failed to open GITHUB_OUTPUT")?;
        writeln!(file, "matrix={json}").context("failed to write GITHUB_OUTPUT")?;
    }

    Ok(())
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .with_context(|| format!("invalid log file path {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(Some(guard))
}
