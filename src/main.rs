use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use linkstats::analytics::{LoadState, StatsView, VisitRecorder};
use linkstats::backend::{BackendApi, CachedStats, HttpBackend};
use linkstats::config::Config;
use linkstats::models::{Handle, Period};
use linkstats::session::Session;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "linkstats")]
#[command(about = "Profile visit recording and visit statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record one visit to a profile
    Visit {
        /// Profile handle
        handle: Handle,
        /// Referrer to report with the visit
        #[arg(long)]
        referrer: Option<String>,
    },
    /// Show visit statistics for a profile
    Stats {
        /// Profile handle
        handle: Handle,
        /// day, week, month or all
        #[arg(long, default_value_t = Period::Week)]
        period: Period,
    },
    /// Show statistics and switch periods interactively (one period per line, `quit` to exit)
    Browse {
        /// Profile handle
        handle: Handle,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("linkstats=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    info!("Using Backend API at {}", config.backend.base_url);

    let backend: Arc<dyn BackendApi> = Arc::new(
        HttpBackend::from_config(&config.backend).context("failed to build Backend API client")?,
    );
    let session = Session::from_config(&config.session);

    match cli.command {
        Commands::Visit { handle, referrer } => {
            let session = match referrer {
                Some(referrer) => session.with_referrer(referrer),
                None => session,
            };
            let recorder = VisitRecorder::new(backend);
            // the submission is detached; wait only so the process does not exit first
            let _ = recorder.record_visit(&handle, &session).await;
            println!("✓ Visit submitted for '{}'", handle);
        }
        Commands::Stats { handle, period } => {
            let stats = Arc::new(CachedStats::from_config(backend, &config.cache));
            let mut view = StatsView::mount_with_period(handle.clone(), session, stats, period).await;

            let failed = matches!(view.settle().await, LoadState::Error(_));
            print!("{}", view.render());
            if failed {
                bail!("could not load {} statistics for '{}'", period, handle);
            }
        }
        Commands::Browse { handle } => {
            let stats = Arc::new(CachedStats::from_config(backend, &config.cache));
            let mut view = StatsView::mount(handle, session, stats).await;
            view.settle().await;
            print!("{}", view.render());

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if matches!(input, "quit" | "q" | "exit") {
                    break;
                }

                let period = match input.parse::<Period>() {
                    Ok(period) => period,
                    Err(err) => {
                        eprintln!("⚠ {err}");
                        continue;
                    }
                };

                view.select_period(period).await;
                if view.state().is_loading() {
                    print!("{}", view.render());
                    view.settle().await;
                }
                print!("{}", view.render());
            }
        }
    }

    Ok(())
}
