use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use renderjob::cli::{Cli, Command};
use renderjob::ui::{self, WatchProgress};
use renderjob::{HttpStore, JobConfig, JobRecord, JobState, RemoteStore, RenderJob, RenderJobConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = RenderJobConfig::load()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(interval) = cli.interval_ms {
        config.sync_interval_ms = interval;
    }
    config.validate()?;
    info!(api_url = %config.api_url, interval_ms = config.sync_interval_ms, "loaded configuration");

    let store = HttpStore::new(&config.api_url)?;
    let job_config = JobConfig {
        auto_start_sync: false,
        ..config.job_config()
    };

    match cli.command {
        Command::Status { id } => {
            let record = store.get(&id).await?;
            let job = RenderJob::new(Some(record), store, job_config)?;
            ui::print_record(&job.serialize());
        }
        Command::Watch { id } => {
            let record = store.get(&id).await?;
            let job = RenderJob::new(Some(record), store, job_config)?;
            if watch(&job).await? == JobState::Failure {
                std::process::exit(1);
            }
        }
        Command::Remove { id } => {
            let record = JobRecord {
                id: Some(id.clone()),
                ..Default::default()
            };
            RenderJob::new(Some(record), store, job_config)?.remove().await?;
            println!("Removed job {id}");
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "renderjob=debug" } else { "renderjob=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Follows the job until it reaches a terminal state or the user hits Ctrl-C.
async fn watch(job: &RenderJob<HttpStore>) -> Result<JobState> {
    let id = job.id();
    let mut state = job.state();
    let progress = WatchProgress::start(&id, state);
    if state.is_terminal() {
        progress.complete(state, job.error_message().as_deref());
        return Ok(state);
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    for target in [
        JobState::Queued,
        JobState::Rendering,
        JobState::Finished,
        JobState::Failure,
    ] {
        let tx = tx.clone();
        job.on(target, move |_, _| {
            let _ = tx.send(target);
        })?;
    }
    job.start_sync()?;

    loop {
        tokio::select! {
            next = rx.recv() => {
                let Some(next) = next else { break };
                progress.update_state(&id, state, next);
                state = next;
                if state.is_terminal() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    job.stop_sync();
    progress.complete(state, job.error_message().as_deref());
    Ok(state)
}
