//! Entry-point orchestration: one merge per requested target, Topic first

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::cli::{Cli, MergeRequest};
use crate::notification::{merge_rule, MergeReport, NotificationRule, TargetKind};
use crate::s3::{NotificationStore, S3NotificationClient};

pub struct App<S> {
    store: S,
    request: MergeRequest,
}

impl App<S3NotificationClient> {
    /// Validate the arguments and connect to S3.
    ///
    /// Argument errors are returned before any client is built.
    pub async fn new(cli: Cli) -> Result<Self> {
        let request = cli.request()?;
        let store = S3NotificationClient::with_config(cli.client_config())
            .await
            .context("Failed to create S3 client")?;
        tracing::debug!(region = store.region(), "Using S3 region");
        Ok(Self::with_store(store, request))
    }
}

impl<S: NotificationStore> App<S> {
    pub fn with_store(store: S, request: MergeRequest) -> Self {
        Self { store, request }
    }

    /// Run every requested merge in order.
    ///
    /// A merge that was rolled back does not stop the next one; a fetch
    /// failure or lost configuration ends the run with that error.
    pub async fn run(&self) -> Result<Vec<MergeReport>> {
        let bucket = &self.request.bucket;
        let mut reports = Vec::new();
        let mut backup = Map::new();

        for (kind, arn) in &self.request.targets {
            let rule = self.request.rule_for(*kind, arn);
            match merge_rule(&self.store, bucket, rule).await {
                Ok(report) => {
                    record_original(&mut backup, *kind, &report.original);
                    reports.push(report);
                }
                Err(err) => {
                    if let Some(original) = err.original() {
                        record_original(&mut backup, *kind, original);
                    }
                    if let Err(backup_err) = self.write_backup(&backup) {
                        tracing::error!("Failed to write backup: {:#}", backup_err);
                    }
                    return Err(err.into());
                }
            }
        }

        self.write_backup(&backup)?;
        Ok(reports)
    }

    fn write_backup(&self, backup: &Map<String, Value>) -> Result<()> {
        let Some(path) = &self.request.backup else {
            return Ok(());
        };
        write_backup_file(path, backup)
    }
}

// Never fails the run: the original list is already in the log output.
fn record_original(backup: &mut Map<String, Value>, kind: TargetKind, original: &[NotificationRule]) {
    match serde_json::to_value(original) {
        Ok(value) => {
            backup.insert(kind.config_key().to_string(), value);
        }
        Err(e) => tracing::error!("Failed to serialize {} configuration for backup: {}", kind, e),
    }
}

fn write_backup_file(path: &Path, backup: &Map<String, Value>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create backup directory {:?}", parent))?;
    }

    let contents = serde_json::to_string_pretty(backup).context("Failed to serialize backup")?;
    fs::write(path, contents).with_context(|| format!("Failed to write backup to {:?}", path))?;

    tracing::info!("Saved original configuration to {:?}", path);
    Ok(())
}
