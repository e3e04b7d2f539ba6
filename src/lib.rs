//! S3 Notification Merge Library
//!
//! Appends an SNS topic or Lambda function notification rule to an S3
//! bucket. The bucket notification API replaces the whole configuration on
//! every write, so the existing list is read, extended and written back,
//! with a rollback to the original list if the write fails.

pub mod app;
pub mod cli;
pub mod error;
pub mod notification;
pub mod s3;
