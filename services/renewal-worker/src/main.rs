//! Renewal worker
//!
//! Extends auto-renewing subscriptions that are about to expire. Runs a single
//! sweep by default; set `RENEWAL_INTERVAL_SECS` to keep sweeping on a timer.

mod config;

use std::sync::Arc;

use chrono::Utc;
use tokio::signal;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use warden_core::{
    RenewalSweeper, SubscriptionLifecycle, SweepReport, TrustedReferenceVerifier,
};
use warden_db::sqlite::{SqliteSubscriptionRepository, SqliteUserRepository};
use warden_db::Repositories;

use crate::config::Config;

type Sweeper = RenewalSweeper<SqliteUserRepository, SqliteSubscriptionRepository>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("renewal_worker=info".parse()?)
                .add_directive("warden_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        renewal_basis = %config.renewal_basis,
        lookahead_hours = config.lookahead.num_hours(),
        interval_secs = config.interval.map(|i| i.as_secs()),
        "Starting renewal worker"
    );

    let pool = warden_db::create_pool(&config.database_url).await?;
    warden_db::run_migrations(&pool).await?;

    let repos = Repositories::new(pool);
    let subscriptions = Arc::new(repos.subscriptions);
    let lifecycle = Arc::new(SubscriptionLifecycle::new(
        Arc::new(repos.users),
        subscriptions.clone(),
        Arc::new(TrustedReferenceVerifier),
        config.renewal_basis,
    ));
    let sweeper = RenewalSweeper::new(lifecycle, subscriptions, config.lookahead);

    match config.interval {
        None => {
            let report = run_sweep(&sweeper).await?;
            if report.has_failures() {
                anyhow::bail!("{} renewal(s) failed", report.failed);
            }
        }
        Some(period) => {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let shutdown = shutdown_signal();
            tokio::pin!(shutdown);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // A failed sweep is retried on the next tick
                        if let Err(e) = run_sweep(&sweeper).await {
                            tracing::error!(error = %e, "Renewal sweep failed");
                        }
                    }
                    () = &mut shutdown => break,
                }
            }
        }
    }

    tracing::info!("Renewal worker stopped");
    Ok(())
}

async fn run_sweep(sweeper: &Sweeper) -> anyhow::Result<SweepReport> {
    let outcomes = sweeper.sweep(Utc::now()).await?;
    let report = SweepReport::from_outcomes(&outcomes);

    tracing::info!(
        candidates = report.candidates,
        renewed = report.renewed,
        skipped = report.skipped,
        not_found = report.not_found,
        failed = report.failed,
        "Renewal sweep complete"
    );
    Ok(report)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
