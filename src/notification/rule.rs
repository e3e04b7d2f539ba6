//! Notification rule data types

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// The only event type the tool subscribes new rules to
pub const OBJECT_CREATED_ANY: &str = "s3:ObjectCreated:*";

/// Kind of notification target, selecting which configuration list is touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Topic,
    Lambda,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Topic => "Topic",
            TargetKind::Lambda => "Lambda",
        }
    }

    /// Name of the list inside a bucket notification configuration
    pub fn config_key(&self) -> &'static str {
        match self {
            TargetKind::Topic => "TopicConfigurations",
            TargetKind::Lambda => "LambdaFunctionConfigurations",
        }
    }

    /// Name of the ARN field inside a single rule
    pub fn arn_field(&self) -> &'static str {
        match self {
            TargetKind::Topic => "TopicArn",
            TargetKind::Lambda => "LambdaFunctionArn",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single key filter rule (`Prefix` or `Suffix`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FilterRule {
    pub name: String,
    pub value: String,
}

impl FilterRule {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One entry of a bucket's topic or lambda notification list.
///
/// Entries read from a bucket are carried verbatim; entries built by
/// [`NotificationRule::object_created`] always have a fresh id, the
/// `s3:ObjectCreated:*` event and a `[Suffix, Prefix]` filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRule {
    id: Option<String>,
    target: TargetKind,
    target_arn: String,
    events: Vec<String>,
    filter_rules: Vec<FilterRule>,
}

impl NotificationRule {
    pub fn new(
        id: Option<String>,
        target: TargetKind,
        target_arn: impl Into<String>,
        events: Vec<String>,
        filter_rules: Vec<FilterRule>,
    ) -> Self {
        Self {
            id,
            target,
            target_arn: target_arn.into(),
            events,
            filter_rules,
        }
    }

    /// Build a rule firing on any object creation under `prefix` ending in `suffix`.
    ///
    /// Absent prefix or suffix become empty strings. The ARN is not validated.
    pub fn object_created(
        target: TargetKind,
        target_arn: &str,
        prefix: Option<&str>,
        suffix: Option<&str>,
    ) -> Self {
        Self {
            id: Some(Uuid::new_v4().to_string()),
            target,
            target_arn: target_arn.to_string(),
            events: vec![OBJECT_CREATED_ANY.to_string()],
            filter_rules: vec![
                FilterRule::new("Suffix", suffix.unwrap_or_default()),
                FilterRule::new("Prefix", prefix.unwrap_or_default()),
            ],
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn target(&self) -> TargetKind {
        self.target
    }

    pub fn target_arn(&self) -> &str {
        &self.target_arn
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn filter_rules(&self) -> &[FilterRule] {
        &self.filter_rules
    }

    /// Value of the named filter rule, if present
    pub fn filter_value(&self, name: &str) -> Option<&str> {
        self.filter_rules
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.value.as_str())
    }
}

#[derive(Serialize)]
struct KeyFilter<'a> {
    #[serde(rename = "FilterRules")]
    filter_rules: &'a [FilterRule],
}

#[derive(Serialize)]
struct Filter<'a> {
    #[serde(rename = "Key")]
    key: KeyFilter<'a>,
}

// Same shape the S3 API documents for TopicConfiguration / LambdaFunctionConfiguration.
impl Serialize for NotificationRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if !self.filter_rules.is_empty() {
            map.serialize_entry(
                "Filter",
                &Filter {
                    key: KeyFilter {
                        filter_rules: &self.filter_rules,
                    },
                },
            )?;
        }
        if let Some(id) = &self.id {
            map.serialize_entry("Id", id)?;
        }
        map.serialize_entry(self.target.arn_field(), &self.target_arn)?;
        map.serialize_entry("Events", &self.events)?;
        map.end()
    }
}

/// Displays a rule list as compact JSON for log output
pub struct RuleList<'a>(pub &'a [NotificationRule]);

impl fmt::Display for RuleList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self.0).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:mytopic";

    #[test]
    fn test_object_created_filter_order() {
        let rule = NotificationRule::object_created(TargetKind::Topic, TOPIC, Some("images/"), Some(".jpg"));
        assert_eq!(
            rule.filter_rules(),
            &[FilterRule::new("Suffix", ".jpg"), FilterRule::new("Prefix", "images/")]
        );
    }

    #[test]
    fn test_object_created_missing_filters_are_empty() {
        let cases = [
            (None, None, "", ""),
            (Some("logs/"), None, "logs/", ""),
            (None, Some(".gz"), "", ".gz"),
            (Some(""), Some(""), "", ""),
        ];
        for (prefix, suffix, want_prefix, want_suffix) in cases {
            let rule = NotificationRule::object_created(TargetKind::Lambda, "arn", prefix, suffix);
            assert_eq!(rule.filter_rules().len(), 2);
            assert_eq!(rule.filter_rules()[0].name, "Suffix");
            assert_eq!(rule.filter_rules()[0].value, want_suffix);
            assert_eq!(rule.filter_rules()[1].name, "Prefix");
            assert_eq!(rule.filter_rules()[1].value, want_prefix);
        }
    }

    #[test]
    fn test_object_created_event_and_target() {
        let rule = NotificationRule::object_created(TargetKind::Topic, TOPIC, Some("a/"), None);
        assert_eq!(rule.events(), &[OBJECT_CREATED_ANY.to_string()]);
        assert_eq!(rule.target(), TargetKind::Topic);
        assert_eq!(rule.target_arn(), TOPIC);
    }

    #[test]
    fn test_object_created_ids_are_unique() {
        let ids: HashSet<String> = (0..100)
            .map(|_| {
                NotificationRule::object_created(TargetKind::Topic, TOPIC, None, None)
                    .id()
                    .unwrap()
                    .to_string()
            })
            .collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_arbitrary_arn_is_accepted() {
        let rule = NotificationRule::object_created(TargetKind::Lambda, "not an arn", None, None);
        assert_eq!(rule.target_arn(), "not an arn");
    }

    #[test]
    fn test_filter_value() {
        let rule = NotificationRule::object_created(TargetKind::Topic, TOPIC, Some("images/"), Some(".jpg"));
        assert_eq!(rule.filter_value("Prefix"), Some("images/"));
        assert_eq!(rule.filter_value("Suffix"), Some(".jpg"));
        assert_eq!(rule.filter_value("Other"), None);
    }

    #[test]
    fn test_target_kind_names() {
        assert_eq!(TargetKind::Topic.config_key(), "TopicConfigurations");
        assert_eq!(TargetKind::Lambda.config_key(), "LambdaFunctionConfigurations");
        assert_eq!(TargetKind::Topic.arn_field(), "TopicArn");
        assert_eq!(TargetKind::Lambda.arn_field(), "LambdaFunctionArn");
        assert_eq!(TargetKind::Lambda.to_string(), "Lambda");
    }

    #[test]
    fn test_serialize_topic_rule_shape() {
        let rule = NotificationRule::new(
            Some("rule-1".to_string()),
            TargetKind::Topic,
            TOPIC,
            vec![OBJECT_CREATED_ANY.to_string()],
            vec![FilterRule::new("Suffix", ".jpg"), FilterRule::new("Prefix", "images/")],
        );
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Filter": {"Key": {"FilterRules": [
                    {"Name": "Suffix", "Value": ".jpg"},
                    {"Name": "Prefix", "Value": "images/"}
                ]}},
                "Id": "rule-1",
                "TopicArn": TOPIC,
                "Events": ["s3:ObjectCreated:*"]
            })
        );
    }

    #[test]
    fn test_serialize_lambda_rule_without_id_or_filter() {
        let rule = NotificationRule::new(
            None,
            TargetKind::Lambda,
            "arn:aws:lambda:us-east-1:123456789012:function:thumb",
            vec!["s3:ObjectRemoved:*".to_string()],
            Vec::new(),
        );
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "LambdaFunctionArn": "arn:aws:lambda:us-east-1:123456789012:function:thumb",
                "Events": ["s3:ObjectRemoved:*"]
            })
        );
    }

    #[test]
    fn test_rule_list_display() {
        assert_eq!(RuleList(&[]).to_string(), "[]");
        let rule = NotificationRule::new(None, TargetKind::Topic, "t", vec![], vec![]);
        assert_eq!(
            RuleList(&[rule]).to_string(),
            r#"[{"TopicArn":"t","Events":[]}]"#
        );
    }
}
