//! Append a rule to a bucket's notification list, rolling back on failure
//!
//! The remote sequence is always: fetch, put(empty), put(merged). If either
//! put fails the original list is written back. The brief window with an
//! empty list is accepted.

use std::fmt;

use tracing::{error, info, warn};

use crate::error::{MergeError, StoreError};
use crate::notification::rule::{NotificationRule, RuleList, TargetKind};
use crate::s3::store::NotificationStore;

/// Which of the two writes failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStage {
    ClearRemote,
    WriteNew,
}

impl fmt::Display for MergeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MergeStage::ClearRemote => "clear-remote",
            MergeStage::WriteNew => "write-new",
        };
        f.write_str(name)
    }
}

/// How a merge that did not lose data ended
#[derive(Debug)]
pub enum MergeStatus {
    Merged,
    /// A write failed at `stage`; the original list was restored.
    RolledBack { stage: MergeStage, cause: StoreError },
}

impl MergeStatus {
    pub fn is_merged(&self) -> bool {
        matches!(self, MergeStatus::Merged)
    }

    fn label(&self) -> &'static str {
        match self {
            MergeStatus::Merged => "succeed",
            MergeStatus::RolledBack { .. } => "fail",
        }
    }
}

/// Result of a merge that left the bucket in a known state
#[derive(Debug)]
pub struct MergeReport {
    pub kind: TargetKind,
    pub bucket: String,
    /// The list as it was before the merge; keep it for manual recovery
    pub original: Vec<NotificationRule>,
    pub merged: Vec<NotificationRule>,
    pub status: MergeStatus,
}

/// Append `rule` to the list of its kind on `bucket`.
///
/// Fails fast with [`MergeError::Fetch`] when the existing list can't be
/// read, without writing anything. Returns [`MergeError::ConfigurationLost`]
/// only when both the write and the rollback failed.
pub async fn merge_rule<S>(
    store: &S,
    bucket: &str,
    rule: NotificationRule,
) -> Result<MergeReport, MergeError>
where
    S: NotificationStore + ?Sized,
{
    let kind = rule.target();

    let original = store
        .fetch(bucket, kind)
        .await
        .map_err(|source| MergeError::Fetch {
            kind,
            bucket: bucket.to_string(),
            source,
        })?;

    // must stay visible under RUST_LOG=warn
    warn!("Existing {} config. PLEASE SAVE THIS FOR ROLLBACK", kind);
    warn!("{}", RuleList(&original));

    let mut merged = original.clone();
    merged.push(rule);
    info!("Appending new config:");
    info!("{}", RuleList(&merged));

    let status = match replace_remote(store, bucket, kind, &merged).await {
        Ok(()) => {
            info!("Config merged for {}", kind);
            MergeStatus::Merged
        }
        Err((stage, cause)) => {
            warn!(%stage, error = %cause, "Failed to merge {} config. Rolling back.", kind);
            if let Err(rollback) = store.put(bucket, kind, &original).await {
                error!(
                    error = %rollback,
                    "Fatal error. You may have lost your {} notification configuration",
                    kind
                );
                info!("{} merging done with status fail", kind);
                return Err(MergeError::ConfigurationLost {
                    kind,
                    bucket: bucket.to_string(),
                    original,
                    stage,
                    cause,
                    rollback,
                });
            }
            info!("Restored original {} config on bucket {}", kind, bucket);
            MergeStatus::RolledBack { stage, cause }
        }
    };

    info!("{} merging done with status {}", kind, status.label());

    Ok(MergeReport {
        kind,
        bucket: bucket.to_string(),
        original,
        merged,
        status,
    })
}

async fn replace_remote<S>(
    store: &S,
    bucket: &str,
    kind: TargetKind,
    merged: &[NotificationRule],
) -> Result<(), (MergeStage, StoreError)>
where
    S: NotificationStore + ?Sized,
{
    store
        .put(bucket, kind, &[])
        .await
        .map_err(|e| (MergeStage::ClearRemote, e))?;
    store
        .put(bucket, kind, merged)
        .await
        .map_err(|e| (MergeStage::WriteNew, e))
}
