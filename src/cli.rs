//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::error::UsageError;
use crate::notification::{NotificationRule, TargetKind};
use crate::s3::S3ClientConfig;

/// Append an S3 bucket notification (SNS topic or Lambda function) without
/// overwriting the existing notification configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "s3-notification-merge", version)]
pub struct Cli {
    /// Bucket name
    #[arg(short = 'b', long)]
    pub bucket: String,

    /// Key prefix the notification is filtered on
    #[arg(short = 'k', long)]
    pub key: String,

    /// Key suffix, e.g. .jpg
    #[arg(short = 's', long)]
    pub suffix: Option<String>,

    /// ARN of the SNS topic to notify
    #[arg(short = 't', long)]
    pub topic_arn: Option<String>,

    /// ARN of the Lambda function to notify
    #[arg(short = 'l', long)]
    pub lambda_arn: Option<String>,

    /// Write the pre-merge configuration to this JSON file
    #[arg(long, value_name = "FILE")]
    pub backup: Option<PathBuf>,

    #[command(flatten)]
    pub aws: AwsArgs,
}

/// AWS connection overrides; anything unset comes from the default provider chain
#[derive(Debug, Clone, Default, Args)]
pub struct AwsArgs {
    /// Named profile from ~/.aws/config
    #[arg(long)]
    pub profile: Option<String>,

    /// AWS region override
    #[arg(long)]
    pub region: Option<String>,

    /// Custom S3 endpoint (MinIO, LocalStack)
    #[arg(long, value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// Use path-style bucket addressing
    #[arg(long)]
    pub force_path_style: bool,

    /// Ask S3 not to verify that the targets exist
    #[arg(long)]
    pub skip_destination_validation: bool,
}

/// A validated merge invocation
#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub bucket: String,
    pub prefix: String,
    pub suffix: Option<String>,
    /// Topic first, then Lambda
    pub targets: Vec<(TargetKind, String)>,
    pub backup: Option<PathBuf>,
}

impl MergeRequest {
    /// Build the rule for one target
    pub fn rule_for(&self, kind: TargetKind, arn: &str) -> NotificationRule {
        NotificationRule::object_created(kind, arn, Some(self.prefix.as_str()), self.suffix.as_deref())
    }
}

impl Cli {
    /// Check that at least one target was given and assemble the request
    pub fn request(&self) -> Result<MergeRequest, UsageError> {
        let targets: Vec<(TargetKind, String)> = [
            (TargetKind::Topic, &self.topic_arn),
            (TargetKind::Lambda, &self.lambda_arn),
        ]
        .into_iter()
        .filter_map(|(kind, arn)| arn.as_ref().map(|arn| (kind, arn.clone())))
        .collect();

        if targets.is_empty() {
            return Err(UsageError::MissingTarget);
        }

        Ok(MergeRequest {
            bucket: self.bucket.clone(),
            prefix: self.key.clone(),
            suffix: self.suffix.clone(),
            targets,
            backup: self.backup.clone(),
        })
    }

    pub fn client_config(&self) -> S3ClientConfig {
        S3ClientConfig {
            profile: self.aws.profile.clone(),
            endpoint_url: self.aws.endpoint_url.clone(),
            force_path_style: self.aws.force_path_style,
            region: self.aws.region.clone(),
            skip_destination_validation: self.aws.skip_destination_validation,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["s3-notification-merge"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_every_flag_has_help() {
        use clap::CommandFactory;

        let command = Cli::command();
        for arg in command.get_arguments() {
            if matches!(arg.get_id().as_str(), "help" | "version") {
                continue;
            }
            assert!(arg.get_help().is_some(), "--{} has no help text", arg.get_id());
        }
    }

    #[test]
    fn test_short_flags() {
        let cli = parse(&["-b", "b1", "-k", "images/", "-s", ".jpg", "-t", "arn:aws:sns:us-east-1:1:mytopic"]);
        assert_eq!(cli.bucket, "b1");
        assert_eq!(cli.key, "images/");
        assert_eq!(cli.suffix.as_deref(), Some(".jpg"));
        assert_eq!(cli.topic_arn.as_deref(), Some("arn:aws:sns:us-east-1:1:mytopic"));
        assert!(cli.lambda_arn.is_none());
    }

    #[test]
    fn test_long_flags() {
        let cli = parse(&[
            "--bucket",
            "b1",
            "--key",
            "logs/",
            "--lambda-arn",
            "arn:aws:lambda:us-east-1:1:function:f",
            "--endpoint-url",
            "http://localhost:9000",
            "--force-path-style",
            "--backup",
            "/tmp/backup.json",
        ]);
        assert_eq!(cli.lambda_arn.as_deref(), Some("arn:aws:lambda:us-east-1:1:function:f"));
        assert!(cli.suffix.is_none());
        assert_eq!(cli.backup, Some(PathBuf::from("/tmp/backup.json")));

        let config = cli.client_config();
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:9000"));
        assert!(config.force_path_style);
        assert!(!config.skip_destination_validation);
    }

    #[test]
    fn test_bucket_and_key_are_required() {
        assert!(Cli::try_parse_from(["s3-notification-merge", "-k", "p/", "-t", "arn"]).is_err());
        assert!(Cli::try_parse_from(["s3-notification-merge", "-b", "b1", "-t", "arn"]).is_err());
    }

    #[test]
    fn test_missing_target_is_usage_error() {
        let cli = parse(&["-b", "b1", "-k", "images/"]);
        assert_eq!(cli.request().unwrap_err(), UsageError::MissingTarget);
    }

    #[test]
    fn test_targets_topic_before_lambda() {
        let cli = parse(&["-b", "b1", "-k", "p/", "-l", "lambda-arn", "-t", "topic-arn"]);
        let request = cli.request().unwrap();
        assert_eq!(
            request.targets,
            vec![
                (TargetKind::Topic, "topic-arn".to_string()),
                (TargetKind::Lambda, "lambda-arn".to_string()),
            ]
        );
    }

    #[test]
    fn test_rule_for_uses_key_as_prefix() {
        let cli = parse(&["-b", "b1", "-k", "images/", "-t", "topic-arn"]);
        let request = cli.request().unwrap();
        let rule = request.rule_for(TargetKind::Topic, "topic-arn");
        assert_eq!(rule.filter_value("Prefix"), Some("images/"));
        assert_eq!(rule.filter_value("Suffix"), Some(""));
    }
}
