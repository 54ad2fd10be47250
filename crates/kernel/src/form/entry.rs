//! Session-persisted form state.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies the handler method that owns a form entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FormKey {
    pub handler: String,
    pub method: String,
}

impl FormKey {
    pub fn new(handler: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            method: method.into(),
        }
    }

    /// Session key holding every entry of this handler.
    pub fn session_key(&self) -> String {
        format!("{FORM_SESSION_PREFIX}{}", self.handler)
    }
}

impl fmt::Display for FormKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.handler, self.method)
    }
}

/// Prefix for per-handler session keys.
pub const FORM_SESSION_PREFIX: &str = "forms.";

/// A recorded failure: per-field messages, or one message for the whole form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Failure {
    Fields(BTreeMap<String, String>),
    Message(String),
}

/// Everything the session remembers about one form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFormEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<Failure>,

    /// Last raw submission, echoed back after a failed attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserved: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
}

impl SessionFormEntry {
    pub fn is_empty(&self) -> bool {
        self.csrf.is_none()
            && self.failed.is_none()
            && self.preserved.is_none()
            && self.success.is_none()
    }

    /// Names of fields with a recorded error, in key order.
    pub fn failed_fields(&self) -> Vec<String> {
        match &self.failed {
            Some(Failure::Fields(fields)) => fields.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

/// All entries of one handler, keyed by method.
pub type HandlerForms = BTreeMap<String, SessionFormEntry>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_shape_follows_json_type() {
        let fields: Failure = serde_json::from_value(json!({"email": "Invalid format"})).unwrap();
        assert!(matches!(fields, Failure::Fields(ref m) if m["email"] == "Invalid format"));

        let message: Failure = serde_json::from_value(json!("Session expired")).unwrap();
        assert_eq!(message, Failure::Message("Session expired".into()));
    }

    #[test]
    fn empty_entry_serializes_to_empty_object() {
        let entry = SessionFormEntry::default();
        assert!(entry.is_empty());
        assert_eq!(serde_json::to_value(&entry).unwrap(), json!({}));
    }

    #[test]
    fn failed_fields_ignores_global_message() {
        let mut entry = SessionFormEntry {
            failed: Some(Failure::Message("start over".into())),
            ..Default::default()
        };
        assert!(entry.failed_fields().is_empty());

        entry.failed = Some(Failure::Fields(BTreeMap::from([
            ("name".to_string(), "Required".to_string()),
            ("email".to_string(), "Invalid".to_string()),
        ])));
        assert_eq!(entry.failed_fields(), vec!["email", "name"]);
    }

    #[test]
    fn session_key_is_per_handler() {
        let key = FormKey::new("contact", "index");
        assert_eq!(key.session_key(), "forms.contact");
        assert_eq!(key.to_string(), "contact::index");
    }
}
