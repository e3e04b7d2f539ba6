//! AWS S3 bucket notification client

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::operation::get_bucket_notification_configuration::GetBucketNotificationConfigurationOutput;
use aws_sdk_s3::types::{
    Event, FilterRuleName, LambdaFunctionConfiguration, NotificationConfiguration,
    NotificationConfigurationFilter, S3KeyFilter, TopicConfiguration,
};
use aws_sdk_s3::Client;

use crate::error::StoreError;
use crate::notification::{FilterRule, NotificationRule, TargetKind};
use crate::s3::store::NotificationStore;

/// Connection settings for [`S3NotificationClient`].
///
/// Unset fields fall back to the default AWS provider chain.
#[derive(Debug, Clone, Default)]
pub struct S3ClientConfig {
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub skip_destination_validation: bool,
}

/// Bucket notification API backed by `aws-sdk-s3`
pub struct S3NotificationClient {
    client: Client,
    current_region: String,
    skip_destination_validation: bool,
}

impl S3NotificationClient {
    /// Create a client with explicit settings
    pub async fn with_config(config: S3ClientConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "s3-notification-merge",
            ));
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();

        let current_region = sdk_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "us-east-1".to_string());

        tracing::debug!(
            region = %current_region,
            endpoint = ?config.endpoint_url,
            "Created S3 notification client"
        );

        Ok(Self {
            client: Client::from_conf(s3_config),
            current_region,
            skip_destination_validation: config.skip_destination_validation,
        })
    }

    /// Get the current region
    pub fn region(&self) -> &str {
        &self.current_region
    }

    async fn get_configuration(
        &self,
        bucket: &str,
    ) -> Result<GetBucketNotificationConfigurationOutput, StoreError> {
        self.client
            .get_bucket_notification_configuration()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| StoreError::request("get", bucket, e))
    }
}

#[async_trait]
impl NotificationStore for S3NotificationClient {
    async fn fetch(&self, bucket: &str, kind: TargetKind) -> Result<Vec<NotificationRule>, StoreError> {
        let current = self.get_configuration(bucket).await?;

        let rules: Vec<NotificationRule> = match kind {
            TargetKind::Topic => current.topic_configurations().iter().map(from_topic).collect(),
            TargetKind::Lambda => current
                .lambda_function_configurations()
                .iter()
                .map(from_lambda)
                .collect(),
        };
        Ok(rules)
    }

    async fn put(
        &self,
        bucket: &str,
        kind: TargetKind,
        rules: &[NotificationRule],
    ) -> Result<(), StoreError> {
        // The API replaces everything, so carry over the sections we aren't touching.
        let current = self.get_configuration(bucket).await?;
        let configuration = replace_section(&current, kind, rules)?;

        self.client
            .put_bucket_notification_configuration()
            .bucket(bucket)
            .notification_configuration(configuration)
            .skip_destination_validation(self.skip_destination_validation)
            .send()
            .await
            .map_err(|e| StoreError::request("put", bucket, e))?;

        tracing::debug!(bucket, %kind, count = rules.len(), "Wrote notification configuration");
        Ok(())
    }
}

/// Copy of `current` with the list of `kind` replaced by `rules`
fn replace_section(
    current: &GetBucketNotificationConfigurationOutput,
    kind: TargetKind,
    rules: &[NotificationRule],
) -> Result<NotificationConfiguration, StoreError> {
    let topics = match kind {
        TargetKind::Topic => rules.iter().map(to_topic).collect::<Result<Vec<_>, _>>()?,
        TargetKind::Lambda => current.topic_configurations().to_vec(),
    };
    let lambdas = match kind {
        TargetKind::Lambda => rules.iter().map(to_lambda).collect::<Result<Vec<_>, _>>()?,
        TargetKind::Topic => current.lambda_function_configurations().to_vec(),
    };

    Ok(NotificationConfiguration::builder()
        .set_topic_configurations(Some(topics))
        .set_lambda_function_configurations(Some(lambdas))
        .set_queue_configurations(Some(current.queue_configurations().to_vec()))
        .set_event_bridge_configuration(current.event_bridge_configuration().cloned())
        .build())
}

fn from_filter(filter: Option<&NotificationConfigurationFilter>) -> Vec<FilterRule> {
    filter
        .and_then(|f| f.key())
        .map(|key| {
            key.filter_rules()
                .iter()
                .map(|r| FilterRule::new(from_rule_name(r.name()), r.value().unwrap_or_default()))
                .collect()
        })
        .unwrap_or_default()
}

fn to_filter(rules: &[FilterRule]) -> Option<NotificationConfigurationFilter> {
    if rules.is_empty() {
        return None;
    }

    let key = rules
        .iter()
        .fold(S3KeyFilter::builder(), |builder, rule| {
            builder.filter_rules(
                aws_sdk_s3::types::FilterRule::builder()
                    .name(to_rule_name(&rule.name))
                    .value(&rule.value)
                    .build(),
            )
        })
        .build();

    Some(NotificationConfigurationFilter::builder().key(key).build())
}

// The SDK spells the names in lowercase; rules carry them as `Prefix` / `Suffix`.
fn from_rule_name(name: Option<&FilterRuleName>) -> &str {
    match name {
        Some(FilterRuleName::Prefix) => "Prefix",
        Some(FilterRuleName::Suffix) => "Suffix",
        Some(other) => other.as_str(),
        None => "",
    }
}

fn to_rule_name(name: &str) -> FilterRuleName {
    if name.eq_ignore_ascii_case("prefix") {
        FilterRuleName::Prefix
    } else if name.eq_ignore_ascii_case("suffix") {
        FilterRuleName::Suffix
    } else {
        FilterRuleName::from(name)
    }
}

fn from_events(events: &[Event]) -> Vec<String> {
    events.iter().map(|e| e.as_str().to_string()).collect()
}

fn to_events(rule: &NotificationRule) -> Vec<Event> {
    rule.events().iter().map(|e| Event::from(e.as_str())).collect()
}

fn from_topic(config: &TopicConfiguration) -> NotificationRule {
    NotificationRule::new(
        config.id().map(|s| s.to_string()),
        TargetKind::Topic,
        config.topic_arn(),
        from_events(config.events()),
        from_filter(config.filter()),
    )
}

fn from_lambda(config: &LambdaFunctionConfiguration) -> NotificationRule {
    NotificationRule::new(
        config.id().map(|s| s.to_string()),
        TargetKind::Lambda,
        config.lambda_function_arn(),
        from_events(config.events()),
        from_filter(config.filter()),
    )
}

fn to_topic(rule: &NotificationRule) -> Result<TopicConfiguration, StoreError> {
    TopicConfiguration::builder()
        .set_id(rule.id().map(|s| s.to_string()))
        .topic_arn(rule.target_arn())
        .set_events(Some(to_events(rule)))
        .set_filter(to_filter(rule.filter_rules()))
        .build()
        .map_err(|e| StoreError::Build {
            kind: TargetKind::Topic,
            source: e.into(),
        })
}

fn to_lambda(rule: &NotificationRule) -> Result<LambdaFunctionConfiguration, StoreError> {
    LambdaFunctionConfiguration::builder()
        .set_id(rule.id().map(|s| s.to_string()))
        .lambda_function_arn(rule.target_arn())
        .set_events(Some(to_events(rule)))
        .set_filter(to_filter(rule.filter_rules()))
        .build()
        .map_err(|e| StoreError::Build {
            kind: TargetKind::Lambda,
            source: e.into(),
        })
}
