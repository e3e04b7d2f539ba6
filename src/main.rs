//! S3 Notification Merge
//!
//! Command-line tool that appends a notification rule to an S3 bucket
//! without overwriting the rules already configured on it.

use anyhow::Result;
use clap::Parser;
use s3_notification_merge::app::App;
use s3_notification_merge::cli::Cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Stage messages go to stdout; default to info so the rollback banner is always shown
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting s3-notification-merge v{}", env!("CARGO_PKG_VERSION"));

    let app = App::new(cli).await?;
    app.run().await?;

    Ok(())
}
