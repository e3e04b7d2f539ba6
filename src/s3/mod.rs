//! S3 bucket notification access
//!
//! This module provides:
//! - [`store::NotificationStore`] - read/replace one notification list of a bucket
//! - [`client::S3NotificationClient`] - the `aws-sdk-s3` implementation

pub mod client;
pub mod store;

// Re-export commonly used types
pub use client::{S3ClientConfig, S3NotificationClient};
pub use store::NotificationStore;
