use std::fmt;

use serde::{Deserialize, Serialize};

/// Onboarding state of a sender or receiver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    #[default]
    Inactive,
    Testing,
    Active,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Inactive => "inactive",
            CustomerStatus::Testing => "testing",
            CustomerStatus::Active => "active",
        }
    }
}

impl fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only description of the organization that submitted a report.
///
/// Passed through to mappers that derive values from sender settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderContext {
    pub name: String,
    pub organization_name: String,
    #[serde(default)]
    pub topic: String,
    /// HL7 processing id (`P`, `T`, `D`).
    #[serde(default)]
    pub processing_type: String,
    pub schema_name: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub customer_status: CustomerStatus,
}

impl SenderContext {
    /// `organization.name`
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.organization_name, self.name)
    }

    /// Looks up a setting by the name used in `useSenderSetting(...)`.
    pub fn setting(&self, name: &str) -> Option<String> {
        let value = match name {
            "name" => self.name.clone(),
            "fullName" => self.full_name(),
            "organizationName" => self.organization_name.clone(),
            "topic" => self.topic.clone(),
            "processingType" | "processingModeCode" => self.processing_type.clone(),
            "schemaName" => self.schema_name.clone(),
            "format" => self.format.clone(),
            "customerStatus" => self.customer_status.to_string(),
            _ => return None,
        };
        Some(value)
    }
}
