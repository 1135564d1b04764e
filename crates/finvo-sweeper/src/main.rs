//! Run-once sweep entrypoint, intended for a periodic scheduler (cron,
//! systemd timer, or a serverless trigger).

use anyhow::{Context, Result};
use chrono::Utc;
use finvo_core::Config;
use finvo_services::{HttpIdentityProvider, Mailer, SmtpMailer};
use finvo_storage::create_blob_store;
use finvo_sweeper::{run_sweep, SweepDeps};
use std::sync::Arc;
use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

fn init_telemetry() {
    let console_fmt = tracing_subscriber::fmt::layer().event_format(
        Format::default()
            .compact()
            .with_target(false)
            .without_time(),
    );
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "info,finvo_sweeper=debug,finvo_storage=debug,finvo_records=debug,finvo_services=debug"
                .into()
        }))
        .with(console_fmt)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    config.validate().context("Configuration validation failed")?;
    init_telemetry();

    let store = create_blob_store(&config)
        .await
        .context("Failed to initialize blob store")?;

    let identity_base_url = config
        .identity_base_url()
        .context("IDENTITY_BASE_URL is required")?
        .to_string();
    let identity_client_id = config
        .identity_client_id()
        .context("IDENTITY_CLIENT_ID is required")?
        .to_string();
    let identity = Arc::new(HttpIdentityProvider::new(
        identity_base_url,
        identity_client_id,
    ));

    let mailer: Arc<dyn Mailer> = Arc::new(
        SmtpMailer::from_config(&config)
            .context("SMTP mailer not configured; set EMAIL_ENABLED and SMTP_* variables")?,
    );

    let deps = SweepDeps::new(store, identity, mailer);
    let summary = run_sweep(&deps, Utc::now()).await?;

    tracing::info!(
        users_seen = summary.users_seen,
        reminders_sent = summary.reminders_sent,
        send_failures = summary.send_failures,
        "Sweeper finished"
    );
    Ok(())
}
