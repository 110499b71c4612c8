//! Medical history attached to a person.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionStatus {
    #[default]
    Active,
    Resolved,
    Chronic,
}

/// A diagnosed condition in a person's medical history.
///
/// `severity` and `status` fall back to `medium` and `active` when the record
/// omits them, the same defaults the API applies on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalCondition {
    pub id: String,
    pub person_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis_date: Option<String>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub is_hereditary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: ConditionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl MedicalCondition {
    pub fn new(
        id: impl Into<String>,
        person_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            person_id: person_id.into(),
            name: name.into(),
            diagnosis_date: None,
            severity: Severity::default(),
            is_hereditary: false,
            notes: None,
            status: ConditionStatus::default(),
            created_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_omitted() {
        let json = r#"{"id":"m1","personId":"p1","name":"Migraine"}"#;
        let condition: MedicalCondition = serde_json::from_str(json).expect("valid condition");
        assert_eq!(condition.severity, Severity::Medium);
        assert_eq!(condition.status, ConditionStatus::Active);
        assert!(!condition.is_hereditary);
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut condition = MedicalCondition::new("m1", "p1", "Glaucoma");
        condition.is_hereditary = true;
        condition.status = ConditionStatus::Resolved;

        let json = serde_json::to_value(&condition).expect("condition serializes");
        assert_eq!(json["personId"], "p1");
        assert_eq!(json["isHereditary"], true);
        assert_eq!(json["status"], "resolved");
        assert_eq!(json["severity"], "medium");
        assert!(json.get("diagnosisDate").is_none());
    }
}
