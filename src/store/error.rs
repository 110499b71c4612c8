//! Errors raised by [`FamilyStore`](super::FamilyStore) mutations.

use std::fmt;

use thiserror::Error;

use crate::model::ParentRole;

/// Kind of record a lookup failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Person,
    MedicalCondition,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Person => f.write_str("person"),
            RecordKind::MedicalCondition => f.write_str("medical condition"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: String },

    #[error("a person with id {0} already exists")]
    DuplicateId(String),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid {role}: no person with id {id}")]
    InvalidParent { role: ParentRole, id: String },

    #[error("{parent} cannot be the {role} of {person}: {person} would become their own ancestor")]
    AncestryCycle {
        person: String,
        parent: String,
        role: ParentRole,
    },
}

impl StoreError {
    pub(crate) fn person_not_found(id: &str) -> Self {
        StoreError::NotFound {
            kind: RecordKind::Person,
            id: id.to_string(),
        }
    }

    pub(crate) fn condition_not_found(id: &str) -> Self {
        StoreError::NotFound {
            kind: RecordKind::MedicalCondition,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            StoreError::person_not_found("p9").to_string(),
            "person not found: p9"
        );
        assert_eq!(
            StoreError::condition_not_found("m1").to_string(),
            "medical condition not found: m1"
        );
        assert_eq!(
            StoreError::InvalidParent {
                role: ParentRole::Mother,
                id: "x".into()
            }
            .to_string(),
            "invalid mother: no person with id x"
        );
        assert_eq!(
            StoreError::MissingField("firstName").to_string(),
            "firstName is required"
        );
    }
}
