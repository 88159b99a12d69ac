//! The artist's mutable set of commission type labels.
//!
//! Unlike [`crate::status::CommissionStatus`], types are free-text labels the
//! artist curates from the creation form. Removing a label never touches
//! existing records; a record may keep referencing a label that is no longer
//! offered.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Labels offered to a fresh session.
pub const DEFAULT_COMMISSION_TYPES: &[&str] = &[
    "大頭貼",
    "半身",
    "全身",
    "插畫",
    "立繪設計",
    "Q版",
    "社團特殊委託",
];

/// Label preselected by the creation form.
pub const DEFAULT_FORM_TYPE: &str = "半身";

/// Maximum length of a single type label.
pub const MAX_TYPE_LABEL_LENGTH: usize = 30;

/// Ordered, duplicate-free list of allowed type labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommissionTypeRegistry {
    labels: Vec<String>,
}

impl Default for CommissionTypeRegistry {
    fn default() -> Self {
        Self {
            labels: DEFAULT_COMMISSION_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl CommissionTypeRegistry {
    /// Build a registry from stored labels, dropping blanks and duplicates.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self { labels: Vec::new() };
        for label in labels {
            let label = label.as_ref().trim();
            if !label.is_empty() && !registry.contains(label) {
                registry.labels.push(label.to_string());
            }
        }
        registry
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The label the creation form starts with: [`DEFAULT_FORM_TYPE`] when
    /// still offered, otherwise the first label.
    pub fn default_label(&self) -> &str {
        if self.contains(DEFAULT_FORM_TYPE) {
            DEFAULT_FORM_TYPE
        } else {
            self.labels.first().map(String::as_str).unwrap_or_default()
        }
    }

    /// Add a label. Returns `Ok(false)` if it was already present.
    pub fn add(&mut self, label: &str) -> Result<bool, CoreError> {
        let label = validate_type_label(label)?;
        if self.contains(label) {
            return Ok(false);
        }
        self.labels.push(label.to_string());
        Ok(true)
    }

    /// Remove a label. Returns `false` if it was not present.
    pub fn remove(&mut self, label: &str) -> bool {
        let before = self.labels.len();
        self.labels.retain(|l| l != label.trim());
        self.labels.len() != before
    }
}

/// Validate a new label, returning it trimmed.
pub fn validate_type_label(label: &str) -> Result<&str, CoreError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(CoreError::Validation(
            "Commission type cannot be empty".to_string(),
        ));
    }
    if label.chars().count() > MAX_TYPE_LABEL_LENGTH {
        return Err(CoreError::Validation(format!(
            "Commission type exceeds maximum length of {MAX_TYPE_LABEL_LENGTH} characters"
        )));
    }
    Ok(label)
}
