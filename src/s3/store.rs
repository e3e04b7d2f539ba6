//! Abstraction over the bucket notification API

use async_trait::async_trait;

use crate::error::StoreError;
use crate::notification::{NotificationRule, TargetKind};

/// Reads and replaces one notification list (topic or lambda) of a bucket.
///
/// `put` replaces the whole list of the given kind; it never merges.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Current list of the given kind, empty when the bucket has none
    async fn fetch(&self, bucket: &str, kind: TargetKind) -> Result<Vec<NotificationRule>, StoreError>;

    /// Replace the list of the given kind
    async fn put(
        &self,
        bucket: &str,
        kind: TargetKind,
        rules: &[NotificationRule],
    ) -> Result<(), StoreError>;
}
