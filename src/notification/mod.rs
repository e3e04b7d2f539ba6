//! Notification rules and the merge-and-write procedure
//!
//! - [`rule::NotificationRule`] - a single topic or lambda notification entry
//! - [`merge::merge_rule`] - appends a rule to a bucket's existing list with rollback

pub mod merge;
pub mod rule;

pub use merge::{merge_rule, MergeReport, MergeStage, MergeStatus};
pub use rule::{FilterRule, NotificationRule, RuleList, TargetKind, OBJECT_CREATED_ANY};
