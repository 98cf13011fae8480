//! Receiver identity.

use relay_model::CustomerStatus;
use serde::{Deserialize, Serialize};

use crate::timing::Timing;

/// Separator between organization and receiver in a full name.
pub const FULL_NAME_SEPARATOR: char = '.';

/// An agent reports are delivered to.
///
/// A receiver without [`Timing`] is sent reports immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receiver {
    pub name: String,
    pub organization_name: String,
    pub topic: String,
    #[serde(default)]
    pub customer_status: CustomerStatus,
    #[serde(default)]
    pub timing: Option<Timing>,
    #[serde(default)]
    pub description: String,
    /// Name shown on the website in place of `name`.
    #[serde(default)]
    pub external_name: Option<String>,
}

impl Receiver {
    pub fn new(name: &str, organization_name: &str, topic: &str) -> Self {
        Self {
            name: name.to_string(),
            organization_name: organization_name.to_string(),
            topic: topic.to_string(),
            customer_status: CustomerStatus::default(),
            timing: None,
            description: String::new(),
            external_name: None,
        }
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = Some(timing);
        self
    }

    /// `organization.name`
    pub fn full_name(&self) -> String {
        format!("{}{FULL_NAME_SEPARATOR}{}", self.organization_name, self.name)
    }

    pub fn display_name(&self) -> &str {
        self.external_name.as_deref().unwrap_or(&self.name)
    }

    /// True when reports are held for batching rather than sent on arrival.
    pub fn is_batched(&self) -> bool {
        self.timing.is_some()
    }
}

/// Splits `organization.name` into its two parts.
///
/// Returns `None` unless the name has exactly one separator.
pub fn parse_full_name(full_name: &str) -> Option<(&str, &str)> {
    let mut parts = full_name.split(FULL_NAME_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(organization), Some(name), None) => Some((organization, name)),
        _ => None,
    }
}
