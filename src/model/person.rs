//! Person records and the lineage view the layout engine works with.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::medical::MedicalCondition;

/// Which parent link a reference fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentRole {
    Father,
    Mother,
}

impl ParentRole {
    /// Both roles, in the order links are resolved and emitted.
    pub const ALL: [ParentRole; 2] = [ParentRole::Father, ParentRole::Mother];
}

impl fmt::Display for ParentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentRole::Father => f.write_str("father"),
            ParentRole::Mother => f.write_str("mother"),
        }
    }
}

/// Anything that can be placed in a family tree.
///
/// The layout engine only needs an identifier and the two optional parent
/// references; everything else about a record is carried through untouched.
pub trait Lineage {
    /// Identifier, unique within one layout computation.
    fn id(&self) -> &str;

    /// Raw father reference, if any.
    fn father_id(&self) -> Option<&str>;

    /// Raw mother reference, if any.
    fn mother_id(&self) -> Option<&str>;

    /// Raw reference for the given role.
    fn parent_id(&self, role: ParentRole) -> Option<&str> {
        match role {
            ParentRole::Father => self.father_id(),
            ParentRole::Mother => self.mother_id(),
        }
    }

    /// Present, non-empty parent references, father first.
    fn parents(&self) -> impl Iterator<Item = (ParentRole, &str)> + '_ {
        ParentRole::ALL.into_iter().filter_map(move |role| {
            self.parent_id(role)
                .filter(|id| !id.is_empty())
                .map(|id| (role, id))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// A family member as returned by the person repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_id: Option<String>,
    #[serde(default)]
    pub medical_conditions: Vec<MedicalCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Person {
    /// Create a person with no parents, dates or medical history.
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        gender: Gender,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            birth_date: None,
            death_date: None,
            gender,
            notes: None,
            father_id: None,
            mother_id: None,
            medical_conditions: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_father(mut self, father_id: impl Into<String>) -> Self {
        self.father_id = Some(father_id.into());
        self
    }

    pub fn with_mother(mut self, mother_id: impl Into<String>) -> Self {
        self.mother_id = Some(mother_id.into());
        self
    }

    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether any recorded condition is marked hereditary.
    pub fn has_hereditary_condition(&self) -> bool {
        self.medical_conditions.iter().any(|c| c.is_hereditary)
    }

    /// Empty parent strings mean "no parent"; store them as `None`.
    pub(crate) fn normalize_parents(&mut self) {
        if self.father_id.as_deref() == Some("") {
            self.father_id = None;
        }
        if self.mother_id.as_deref() == Some("") {
            self.mother_id = None;
        }
    }
}

impl Lineage for Person {
    fn id(&self) -> &str {
        &self.id
    }

    fn father_id(&self) -> Option<&str> {
        self.father_id.as_deref()
    }

    fn mother_id(&self) -> Option<&str> {
        self.mother_id.as_deref()
    }
}

/// The summary a tree node shows for a person.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonCard {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub has_medical: bool,
    pub has_hereditary: bool,
}

impl From<&Person> for PersonCard {
    fn from(person: &Person) -> Self {
        Self {
            first_name: person.first_name.clone(),
            last_name: person.last_name.clone(),
            gender: person.gender,
            has_medical: !person.medical_conditions.is_empty(),
            has_hereditary: person.has_hereditary_condition(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConditionStatus, Severity};

    #[test]
    fn test_parents_skip_empty_references() {
        let mut person = Person::new("c1", "Ana", "Ruiz", Gender::Female).with_father("");
        person.mother_id = Some("m1".to_string());

        let parents: Vec<_> = person.parents().collect();
        assert_eq!(parents, vec![(ParentRole::Mother, "m1")]);
    }

    #[test]
    fn test_parents_father_first() {
        let person = Person::new("c1", "Ana", "Ruiz", Gender::Female)
            .with_mother("m1")
            .with_father("f1");

        let parents: Vec<_> = person.parents().collect();
        assert_eq!(
            parents,
            vec![(ParentRole::Father, "f1"), (ParentRole::Mother, "m1")]
        );
    }

    #[test]
    fn test_normalize_parents() {
        let mut person = Person::new("c1", "Ana", "Ruiz", Gender::Female)
            .with_father("")
            .with_mother("m1");
        person.normalize_parents();
        assert_eq!(person.father_id, None);
        assert_eq!(person.mother_id.as_deref(), Some("m1"));
    }

    #[test]
    fn test_deserialize_api_json() {
        let json = r#"{
            "id": "p1",
            "firstName": "Luis",
            "lastName": "Vega",
            "gender": "male",
            "birthDate": "1950-03-01T00:00:00.000Z",
            "fatherId": null,
            "motherId": "p0",
            "medicalConditions": [{
                "id": "m1",
                "personId": "p1",
                "name": "Diabetes",
                "severity": "high",
                "isHereditary": true,
                "status": "chronic"
            }],
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        }"#;

        let person: Person = serde_json::from_str(json).expect("valid person json");
        assert_eq!(person.id, "p1");
        assert_eq!(person.gender, Gender::Male);
        assert_eq!(person.father_id, None);
        assert_eq!(person.mother_id.as_deref(), Some("p0"));
        assert_eq!(person.medical_conditions.len(), 1);
        assert_eq!(person.medical_conditions[0].severity, Severity::High);
        assert_eq!(person.medical_conditions[0].status, ConditionStatus::Chronic);
        assert!(person.has_hereditary_condition());
    }

    #[test]
    fn test_medical_conditions_default_to_empty() {
        let json = r#"{"id":"p1","firstName":"Luis","lastName":"Vega","gender":"other"}"#;
        let person: Person = serde_json::from_str(json).expect("valid person json");
        assert!(person.medical_conditions.is_empty());
        assert_eq!(person.gender, Gender::Other);
    }

    #[test]
    fn test_person_card() {
        let mut person = Person::new("p1", "Luis", "Vega", Gender::Male);
        let card = PersonCard::from(&person);
        assert!(!card.has_medical);
        assert!(!card.has_hereditary);

        person
            .medical_conditions
            .push(MedicalCondition::new("m1", "p1", "Asthma"));
        let card = PersonCard::from(&person);
        assert!(card.has_medical);
        assert!(!card.has_hereditary);

        person.medical_conditions[0].is_hereditary = true;
        let card = PersonCard::from(&person);
        assert!(card.has_hereditary);

        let json = serde_json::to_value(&card).expect("card serializes");
        assert_eq!(json["firstName"], "Luis");
        assert_eq!(json["hasHereditary"], true);
    }
}
