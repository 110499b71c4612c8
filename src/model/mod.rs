//! Family data model.
//!
//! These are the records the person repository hands to the client: persons
//! with optional father/mother links and their medical history. Field names
//! serialize in camelCase so the JSON returned by the REST API deserializes
//! directly into these types.

mod medical;
mod person;

pub use medical::{ConditionStatus, MedicalCondition, Severity};
pub use person::{Gender, Lineage, ParentRole, Person, PersonCard};
