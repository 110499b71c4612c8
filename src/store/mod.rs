//! FamilyStore - client-side family state.
//!
//! Holds the persons the repository returned for the signed-in user, the
//! current selection and two counters: `revision` moves on every published
//! change, `persons_revision` only when the person list itself is replaced.
//! Every accepted mutation swaps in a new immutable person list, bumps both
//! and notifies subscribers with a [`Snapshot`]; selection changes bump only
//! `revision`. Snapshots share the list through an `Arc`, so a
//! snapshot taken before a mutation keeps seeing the old state.
//!
//! Mutations mirror the rules the REST API enforces: names are required,
//! parent references must name a known person, and a failed mutation leaves
//! the store untouched. On top of that the store refuses parent links that
//! would make someone their own ancestor.

mod error;
mod selection;

use std::sync::Arc;

use log::{debug, info};

pub use error::{RecordKind, StoreError};
pub use selection::Selection;

use crate::graph::FamilyGraph;
use crate::model::{Lineage, MedicalCondition, Person};

/// Callback invoked after every accepted mutation.
pub type Listener = Box<dyn FnMut(&Snapshot)>;

/// Immutable view of the store at one revision.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    revision: u64,
    persons_revision: u64,
    persons: Arc<[Person]>,
    selected: Option<String>,
}

impl Snapshot {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Revision of the person list this snapshot holds.
    pub fn persons_revision(&self) -> u64 {
        self.persons_revision
    }

    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    pub fn person(&self, id: &str) -> Option<&Person> {
        self.persons.iter().find(|p| p.id == id)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_person(&self) -> Option<&Person> {
        self.selected_id().and_then(|id| self.person(id))
    }
}

/// The family repository object.
pub struct FamilyStore {
    persons: Arc<[Person]>,
    selection: Selection,
    revision: u64,
    persons_revision: u64,
    listeners: Vec<Listener>,
}

impl FamilyStore {
    /// Create an empty store at revision 0.
    pub fn new() -> Self {
        Self {
            persons: Arc::from(Vec::new()),
            selection: Selection::new(),
            revision: 0,
            persons_revision: 0,
            listeners: Vec::new(),
        }
    }

    /// Register a callback for future mutations.
    pub fn subscribe(&mut self, listener: impl FnMut(&Snapshot) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.revision,
            persons_revision: self.persons_revision,
            persons: Arc::clone(&self.persons),
            selected: self.selection.current().map(str::to_string),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Bumped only when persons or their medical history change.
    pub fn persons_revision(&self) -> u64 {
        self.persons_revision
    }

    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    pub fn person(&self, id: &str) -> Option<&Person> {
        self.persons.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Relationship graph over the current persons.
    pub fn graph(&self) -> FamilyGraph {
        FamilyGraph::from_persons(&self.persons)
    }

    // =========================================================================
    // Person Operations
    // =========================================================================

    /// Replace every person with a fresh list from the repository.
    ///
    /// The list is taken as-is: dangling or cyclic references coming from
    /// stored data are kept and left for the layout to degrade gracefully.
    /// The selection survives if the selected person is still present.
    pub fn load(&mut self, persons: Vec<Person>) -> Snapshot {
        let mut persons = persons;
        for person in &mut persons {
            person.normalize_parents();
        }
        if let Some(id) = self.selection.current() {
            if !persons.iter().any(|p| p.id == id) {
                self.selection.clear();
            }
        }
        info!("loaded {} person(s)", persons.len());
        self.commit(persons)
    }

    /// Add a newly created person.
    pub fn add_person(&mut self, person: Person) -> Result<Snapshot, StoreError> {
        let mut person = person;
        person.normalize_parents();
        validate_person(&person)?;
        if self.person(&person.id).is_some() {
            return Err(StoreError::DuplicateId(person.id));
        }
        self.validate_parents(&person)?;

        debug!("adding person {} ({})", person.id, person.full_name());
        let mut persons = self.persons.to_vec();
        persons.push(person);
        Ok(self.commit(persons))
    }

    /// Replace the person with id `id`.
    ///
    /// The stored id is kept even if `person.id` differs.
    pub fn update_person(&mut self, id: &str, person: Person) -> Result<Snapshot, StoreError> {
        let position = self
            .position_of(id)
            .ok_or_else(|| StoreError::person_not_found(id))?;

        let mut person = person;
        person.id = id.to_string();
        person.normalize_parents();
        validate_person(&person)?;
        self.validate_parents(&person)?;

        debug!("updating person {id}");
        let mut persons = self.persons.to_vec();
        persons[position] = person;
        Ok(self.commit(persons))
    }

    /// Remove a person and their medical history.
    ///
    /// Children keep their reference to the removed parent; it becomes a
    /// dangling reference that the layout treats as "no parent".
    pub fn remove_person(&mut self, id: &str) -> Result<Snapshot, StoreError> {
        let position = self
            .position_of(id)
            .ok_or_else(|| StoreError::person_not_found(id))?;

        if self.selection.is_selected(id) {
            self.selection.clear();
        }

        debug!("removing person {id}");
        let mut persons = self.persons.to_vec();
        persons.remove(position);
        Ok(self.commit(persons))
    }

    // =========================================================================
    // Medical History
    // =========================================================================

    /// Attach a condition to the person named by `condition.person_id`.
    pub fn add_medical_condition(
        &mut self,
        condition: MedicalCondition,
    ) -> Result<Snapshot, StoreError> {
        validate_condition(&condition)?;
        let position = self
            .position_of(&condition.person_id)
            .ok_or_else(|| StoreError::person_not_found(&condition.person_id))?;

        let mut persons = self.persons.to_vec();
        persons[position].medical_conditions.push(condition);
        Ok(self.commit(persons))
    }

    /// Replace the condition with id `id`, keeping its id and owner.
    pub fn update_medical_condition(
        &mut self,
        id: &str,
        condition: MedicalCondition,
    ) -> Result<Snapshot, StoreError> {
        validate_condition(&condition)?;
        let (p, c) = self
            .condition_position(id)
            .ok_or_else(|| StoreError::condition_not_found(id))?;

        let mut persons = self.persons.to_vec();
        let slot = &mut persons[p].medical_conditions[c];
        let mut condition = condition;
        condition.id = slot.id.clone();
        condition.person_id = slot.person_id.clone();
        *slot = condition;
        Ok(self.commit(persons))
    }

    pub fn remove_medical_condition(&mut self, id: &str) -> Result<Snapshot, StoreError> {
        let (p, c) = self
            .condition_position(id)
            .ok_or_else(|| StoreError::condition_not_found(id))?;

        let mut persons = self.persons.to_vec();
        persons[p].medical_conditions.remove(c);
        Ok(self.commit(persons))
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Focus the detail view on `id`.
    pub fn select(&mut self, id: &str) -> Result<Snapshot, StoreError> {
        if self.person(id).is_none() {
            return Err(StoreError::person_not_found(id));
        }
        self.selection.select(id);
        Ok(self.publish())
    }

    pub fn clear_selection(&mut self) -> Snapshot {
        self.selection.clear();
        self.publish()
    }

    pub fn selected_person(&self) -> Option<&Person> {
        self.selection.current().and_then(|id| self.person(id))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn position_of(&self, id: &str) -> Option<usize> {
        self.persons.iter().position(|p| p.id == id)
    }

    fn condition_position(&self, id: &str) -> Option<(usize, usize)> {
        self.persons.iter().enumerate().find_map(|(p, person)| {
            person
                .medical_conditions
                .iter()
                .position(|c| c.id == id)
                .map(|c| (p, c))
        })
    }

    /// Parent references must name a known person and must not loop back.
    fn validate_parents(&self, person: &Person) -> Result<(), StoreError> {
        let graph = self.graph();
        for (role, parent) in person.parents() {
            if graph.would_create_cycle(&person.id, parent) {
                return Err(StoreError::AncestryCycle {
                    person: person.id.clone(),
                    parent: parent.to_string(),
                    role,
                });
            }
            if !graph.contains(parent) {
                return Err(StoreError::InvalidParent {
                    role,
                    id: parent.to_string(),
                });
            }
        }
        Ok(())
    }

    fn commit(&mut self, persons: Vec<Person>) -> Snapshot {
        self.persons = persons.into();
        self.persons_revision += 1;
        self.publish()
    }

    fn publish(&mut self) -> Snapshot {
        self.revision += 1;
        let snapshot = self.snapshot();
        for listener in &mut self.listeners {
            listener(&snapshot);
        }
        snapshot
    }
}

impl Default for FamilyStore {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_person(person: &Person) -> Result<(), StoreError> {
    if person.first_name.trim().is_empty() {
        return Err(StoreError::MissingField("firstName"));
    }
    if person.last_name.trim().is_empty() {
        return Err(StoreError::MissingField("lastName"));
    }
    Ok(())
}

fn validate_condition(condition: &MedicalCondition) -> Result<(), StoreError> {
    if condition.name.trim().is_empty() {
        return Err(StoreError::MissingField("name"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::model::{Gender, ParentRole, Severity};

    fn person(id: &str) -> Person {
        Person::new(id, id, "Test", Gender::Other)
    }

    fn seeded() -> FamilyStore {
        let mut store = FamilyStore::new();
        store.load(vec![
            person("dad"),
            person("mom"),
            person("kid").with_father("dad").with_mother("mom"),
        ]);
        store
    }

    #[test]
    fn test_load_bumps_revision() {
        let mut store = FamilyStore::new();
        assert_eq!(store.revision(), 0);
        assert!(store.is_empty());

        let snapshot = store.load(vec![person("a"), person("b")]);
        assert_eq!(snapshot.revision(), 1);
        assert_eq!(snapshot.persons().len(), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_load_keeps_dangling_references() {
        let mut store = FamilyStore::new();
        store.load(vec![person("a").with_father("gone").with_mother("")]);
        let a = store.person("a").expect("a loaded");
        assert_eq!(a.father_id.as_deref(), Some("gone"));
        assert_eq!(a.mother_id, None, "empty reference normalized away");
    }

    #[test]
    fn test_add_person() {
        let mut store = seeded();
        let snapshot = store
            .add_person(person("kid2").with_mother("mom"))
            .expect("valid person");
        assert_eq!(snapshot.persons().len(), 4);
        assert_eq!(snapshot.persons()[3].id, "kid2");
    }

    #[test]
    fn test_add_person_rejects_invalid_input() {
        let mut store = seeded();
        let revision = store.revision();

        let mut nameless = person("x");
        nameless.first_name = "  ".into();
        assert_eq!(
            store.add_person(nameless),
            Err(StoreError::MissingField("firstName"))
        );

        assert_eq!(
            store.add_person(person("dad")),
            Err(StoreError::DuplicateId("dad".into()))
        );

        assert_eq!(
            store.add_person(person("x").with_father("ghost")),
            Err(StoreError::InvalidParent {
                role: ParentRole::Father,
                id: "ghost".into()
            })
        );

        assert!(matches!(
            store.add_person(person("x").with_mother("x")),
            Err(StoreError::AncestryCycle { .. })
        ));

        assert_eq!(store.revision(), revision, "failed mutations do not commit");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_update_person() {
        let mut store = seeded();
        let mut renamed = person("ignored-id");
        renamed.first_name = "Junior".into();
        renamed.father_id = Some("dad".into());

        let snapshot = store.update_person("kid", renamed).expect("valid update");
        let kid = snapshot.person("kid").expect("id kept");
        assert_eq!(kid.first_name, "Junior");
        assert_eq!(kid.mother_id, None);
        assert!(snapshot.person("ignored-id").is_none());
    }

    #[test]
    fn test_update_rejects_ancestry_cycle() {
        let mut store = seeded();
        let err = store
            .update_person("dad", person("dad").with_father("kid"))
            .expect_err("kid descends from dad");
        assert_eq!(
            err,
            StoreError::AncestryCycle {
                person: "dad".into(),
                parent: "kid".into(),
                role: ParentRole::Father,
            }
        );
    }

    #[test]
    fn test_update_missing_person() {
        let mut store = seeded();
        assert_eq!(
            store.update_person("nobody", person("nobody")),
            Err(StoreError::person_not_found("nobody"))
        );
    }

    #[test]
    fn test_remove_person_clears_selection() {
        let mut store = seeded();
        store.select("dad").expect("dad exists");
        assert_eq!(store.selected_person().map(|p| p.id.as_str()), Some("dad"));

        let snapshot = store.remove_person("dad").expect("dad exists");
        assert_eq!(snapshot.selected_id(), None);
        assert_eq!(snapshot.persons().len(), 2);

        // The child's reference is left dangling
        let kid = snapshot.person("kid").expect("kid kept");
        assert_eq!(kid.father_id.as_deref(), Some("dad"));
    }

    #[test]
    fn test_remove_other_person_keeps_selection() {
        let mut store = seeded();
        store.select("mom").expect("mom exists");
        let snapshot = store.remove_person("dad").expect("dad exists");
        assert_eq!(snapshot.selected_id(), Some("mom"));
    }

    #[test]
    fn test_update_keeps_selection() {
        let mut store = seeded();
        store.select("mom").expect("mom exists");
        let mut updated = person("mom");
        updated.notes = Some("Born abroad".into());
        let snapshot = store.update_person("mom", updated).expect("valid update");
        let selected = snapshot.selected_person().expect("still selected");
        assert_eq!(selected.notes.as_deref(), Some("Born abroad"));
    }

    #[test]
    fn test_select_unknown_person() {
        let mut store = seeded();
        assert_eq!(
            store.select("nobody"),
            Err(StoreError::person_not_found("nobody"))
        );
        let snapshot = store.clear_selection();
        assert_eq!(snapshot.selected_id(), None);
    }

    #[test]
    fn test_load_drops_vanished_selection() {
        let mut store = seeded();
        store.select("kid").expect("kid exists");
        let snapshot = store.load(vec![person("dad")]);
        assert_eq!(snapshot.selected_id(), None);

        store.select("dad").expect("dad exists");
        let snapshot = store.load(vec![person("dad"), person("mom")]);
        assert_eq!(snapshot.selected_id(), Some("dad"));
    }

    #[test]
    fn test_medical_conditions() {
        let mut store = seeded();

        let mut condition = MedicalCondition::new("m1", "kid", "Asthma");
        condition.is_hereditary = true;
        store.add_medical_condition(condition).expect("kid exists");
        assert_eq!(store.person("kid").unwrap().medical_conditions.len(), 1);
        assert!(store.person("kid").unwrap().has_hereditary_condition());

        let mut changed = MedicalCondition::new("other", "dad", "Asthma (mild)");
        changed.severity = Severity::Low;
        store
            .update_medical_condition("m1", changed)
            .expect("m1 exists");
        let kid = store.person("kid").unwrap();
        assert_eq!(kid.medical_conditions[0].id, "m1");
        assert_eq!(kid.medical_conditions[0].person_id, "kid");
        assert_eq!(kid.medical_conditions[0].name, "Asthma (mild)");
        assert_eq!(kid.medical_conditions[0].severity, Severity::Low);
        assert!(store.person("dad").unwrap().medical_conditions.is_empty());

        store.remove_medical_condition("m1").expect("m1 exists");
        assert!(store.person("kid").unwrap().medical_conditions.is_empty());
    }

    #[test]
    fn test_medical_condition_errors() {
        let mut store = seeded();
        assert_eq!(
            store.add_medical_condition(MedicalCondition::new("m1", "ghost", "Flu")),
            Err(StoreError::person_not_found("ghost"))
        );
        assert_eq!(
            store.add_medical_condition(MedicalCondition::new("m1", "kid", "")),
            Err(StoreError::MissingField("name"))
        );
        assert_eq!(
            store.remove_medical_condition("m404"),
            Err(StoreError::condition_not_found("m404"))
        );
    }

    #[test]
    fn test_selection_keeps_persons_revision() {
        let mut store = seeded();
        let persons_revision = store.persons_revision();
        let revision = store.revision();

        let snapshot = store.select("kid").expect("kid exists");
        assert_eq!(snapshot.revision(), revision + 1);
        assert_eq!(snapshot.persons_revision(), persons_revision);

        store.clear_selection();
        assert_eq!(store.persons_revision(), persons_revision);

        store.remove_person("mom").expect("mom exists");
        assert_eq!(store.persons_revision(), persons_revision + 1);
    }

    #[test]
    fn test_snapshots_are_immutable() {
        let mut store = seeded();
        let before = store.snapshot();
        store.remove_person("kid").expect("kid exists");
        assert_eq!(before.persons().len(), 3);
        assert_eq!(store.len(), 2);
        assert!(before.revision() < store.revision());
    }

    #[test]
    fn test_listeners_notified_on_commit() {
        let seen: Rc<RefCell<Vec<u64>>> = Rc::new(RefCell::new(Vec::new()));
        let mut store = FamilyStore::new();
        let sink = Rc::clone(&seen);
        store.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.revision()));

        store.load(vec![person("a")]);
        store.add_person(person("b")).expect("valid");
        let _ = store.add_person(person("b"));
        store.select("a").expect("a exists");

        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }
}
