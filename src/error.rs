//! Error types for the merge tool

use thiserror::Error;

use crate::notification::{MergeStage, NotificationRule, TargetKind};

/// Boxed error from the AWS SDK (or a test double)
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Invalid combination of command-line arguments
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("At least one of --lambda-arn (-l) or --topic-arn (-t) is required.")]
    MissingTarget,
}

/// Failure talking to the bucket notification API
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to {operation} notification configuration of bucket {bucket}")]
    Request {
        operation: &'static str,
        bucket: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to build {kind} configuration")]
    Build {
        kind: TargetKind,
        #[source]
        source: BoxError,
    },
}

impl StoreError {
    pub fn request(
        operation: &'static str,
        bucket: &str,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Request {
            operation,
            bucket: bucket.to_string(),
            source: source.into(),
        }
    }
}

/// Failure of a single merge that left the caller something to act on
#[derive(Debug, Error)]
pub enum MergeError {
    /// The existing configuration could not be read; nothing was written.
    #[error("could not read existing {kind} configuration of bucket {bucket}")]
    Fetch {
        kind: TargetKind,
        bucket: String,
        #[source]
        source: StoreError,
    },

    /// Both the write and the rollback failed.
    #[error(
        "Fatal error. You may have lost your {kind} notification configuration \
         on bucket {bucket} (write failed at {stage}: {cause}; rollback failed)"
    )]
    ConfigurationLost {
        kind: TargetKind,
        bucket: String,
        original: Vec<NotificationRule>,
        stage: MergeStage,
        cause: StoreError,
        #[source]
        rollback: StoreError,
    },
}

impl MergeError {
    /// The pre-merge configuration, when one was read
    pub fn original(&self) -> Option<&[NotificationRule]> {
        match self {
            MergeError::Fetch { .. } => None,
            MergeError::ConfigurationLost { original, .. } => Some(original),
        }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            MergeError::Fetch { kind, .. } | MergeError::ConfigurationLost { kind, .. } => *kind,
        }
    }
}
