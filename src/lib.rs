//! Family Tree - WASM Module
//!
//! This module provides the client-side core of the family tree viewer:
//! the family state, the generational layout and hit testing. It is compiled
//! to WebAssembly and exposes a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `model`: Person and medical-history records, as the REST API returns them
//! - `store`: Repository object holding persons and selection, with snapshots
//! - `graph`: Parent/child relationship queries using petgraph's StableGraph
//! - `layout`: Generation resolution and generational node/edge layout
//! - `spatial`: R-tree spatial index for O(log n) hit testing
//! - `view`: The last computed layout paired with its spatial index

use js_sys::Float32Array;
use log::{Level, info, warn};
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod graph;
pub mod layout;
pub mod model;
pub mod spatial;
pub mod store;
pub mod view;

use layout::LayoutConfig;
use model::{MedicalCondition, Person};
use store::{FamilyStore, StoreError};
use view::TreeView;

/// Initialize the WASM module: panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(Level::Debug);
    info!("family tree module initialized");
}

impl From<StoreError> for JsValue {
    fn from(err: StoreError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Serialize with plain JS objects for maps, the shape the renderer expects.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    Ok(value.serialize(&serializer)?)
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = queueMicrotask)]
    fn queue_microtask(callback: &js_sys::Function);
}

fn is_absent(value: &JsValue) -> bool {
    value.is_undefined() || value.is_null()
}

/// Main entry point for the family tree.
///
/// Wraps the family store and the last computed tree view and provides the
/// public API exposed to JavaScript.
#[wasm_bindgen]
pub struct FamilyTreeWasm {
    store: FamilyStore,
    view: TreeView,
    config: LayoutConfig,
}

#[wasm_bindgen]
impl FamilyTreeWasm {
    /// Create an empty family tree.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            store: FamilyStore::new(),
            view: TreeView::empty(),
            config: LayoutConfig::default(),
        }
    }

    // =========================================================================
    // Person Operations
    // =========================================================================

    /// Replace all persons with the array returned by `GET /api/persons`.
    pub fn load(&mut self, persons: JsValue) -> Result<(), JsValue> {
        let persons: Vec<Person> = serde_wasm_bindgen::from_value(persons)?;
        self.store.load(persons);
        Ok(())
    }

    /// Add a person created by the API.
    #[wasm_bindgen(js_name = addPerson)]
    pub fn add_person(&mut self, person: JsValue) -> Result<(), JsValue> {
        let person: Person = serde_wasm_bindgen::from_value(person)?;
        self.store.add_person(person)?;
        Ok(())
    }

    /// Replace a person with the record returned by the API.
    #[wasm_bindgen(js_name = updatePerson)]
    pub fn update_person(&mut self, id: &str, person: JsValue) -> Result<(), JsValue> {
        let person: Person = serde_wasm_bindgen::from_value(person)?;
        self.store.update_person(id, person)?;
        Ok(())
    }

    /// Remove a person deleted through the API.
    #[wasm_bindgen(js_name = removePerson)]
    pub fn remove_person(&mut self, id: &str) -> Result<(), JsValue> {
        self.store.remove_person(id)?;
        Ok(())
    }

    /// Get the number of persons.
    #[wasm_bindgen(js_name = personCount)]
    pub fn person_count(&self) -> u32 {
        self.store.len() as u32
    }

    /// Get the store revision; it increases after every accepted change.
    pub fn revision(&self) -> f64 {
        self.store.revision() as f64
    }

    /// Get a person record by id, or undefined.
    #[wasm_bindgen(js_name = getPerson)]
    pub fn get_person(&self, id: &str) -> Result<JsValue, JsValue> {
        match self.store.person(id) {
            Some(person) => to_js(person),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Register a callback invoked with the new revision after each change.
    ///
    /// Delivery is queued as a microtask, so the callback runs once the
    /// mutating call has returned and may call back into this object (for
    /// example `computeLayout`).
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&mut self, callback: js_sys::Function) {
        self.store.subscribe(move |snapshot| {
            let callback = callback.clone();
            let revision = snapshot.revision() as f64;
            let deliver = Closure::once_into_js(move || {
                if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_f64(revision)) {
                    warn!("change listener threw: {err:?}");
                }
            });
            queue_microtask(deliver.unchecked_ref());
        });
    }

    // =========================================================================
    // Medical History
    // =========================================================================

    #[wasm_bindgen(js_name = addMedicalCondition)]
    pub fn add_medical_condition(&mut self, condition: JsValue) -> Result<(), JsValue> {
        let condition: MedicalCondition = serde_wasm_bindgen::from_value(condition)?;
        self.store.add_medical_condition(condition)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = updateMedicalCondition)]
    pub fn update_medical_condition(
        &mut self,
        id: &str,
        condition: JsValue,
    ) -> Result<(), JsValue> {
        let condition: MedicalCondition = serde_wasm_bindgen::from_value(condition)?;
        self.store.update_medical_condition(id, condition)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = removeMedicalCondition)]
    pub fn remove_medical_condition(&mut self, id: &str) -> Result<(), JsValue> {
        self.store.remove_medical_condition(id)?;
        Ok(())
    }

    // =========================================================================
    // Selection
    // =========================================================================

    #[wasm_bindgen(js_name = selectPerson)]
    pub fn select_person(&mut self, id: &str) -> Result<(), JsValue> {
        self.store.select(id)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        self.store.clear_selection();
    }

    /// Get the selected person record, or undefined.
    #[wasm_bindgen(js_name = selectedPerson)]
    pub fn selected_person(&self) -> Result<JsValue, JsValue> {
        match self.store.selected_person() {
            Some(person) => to_js(person),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Lay out the current persons.
    ///
    /// `options` is an optional partial `LayoutConfig` (`levelSpacing`,
    /// `siblingSpacing`, `originX`, `rankMode`, `edgePolicy`); omitted fields
    /// take their defaults. Without options the previous configuration is
    /// reused. Returns `{ nodes, edges, rankCount }`.
    #[wasm_bindgen(js_name = computeLayout)]
    pub fn compute_layout(&mut self, options: JsValue) -> Result<JsValue, JsValue> {
        if !is_absent(&options) {
            self.config = serde_wasm_bindgen::from_value(options)?;
        }
        self.view = TreeView::compute(&self.store.snapshot(), &self.config);
        to_js(self.view.layout())
    }

    /// Whether the last layout still reflects the current persons.
    ///
    /// Selection changes do not make a layout stale.
    #[wasm_bindgen(js_name = isLayoutCurrent)]
    pub fn is_layout_current(&self) -> bool {
        self.view.is_current(self.store.persons_revision())
    }

    /// Get the positions of the last layout as [x0, y0, x1, y1, ...].
    #[wasm_bindgen(js_name = getPositions)]
    pub fn get_positions(&self) -> Float32Array {
        Float32Array::from(&self.view.positions()[..])
    }

    /// Get the bounding box of the last layout.
    ///
    /// Returns [min_x, min_y, max_x, max_y], or None if it has no nodes.
    #[wasm_bindgen(js_name = getBounds)]
    pub fn get_bounds(&self) -> Option<Vec<f32>> {
        self.view
            .bounds()
            .map(|b| vec![b.min_x, b.min_y, b.max_x, b.max_y])
    }

    // =========================================================================
    // Hit Testing
    // =========================================================================

    /// Find the person drawn nearest to a point within a maximum distance.
    #[wasm_bindgen(js_name = findPersonAt)]
    pub fn find_person_at(&self, x: f32, y: f32, max_distance: f32) -> Option<String> {
        self.view.person_at(x, y, max_distance).map(str::to_string)
    }

    /// Find all persons drawn inside a rectangle.
    #[wasm_bindgen(js_name = findPersonsInRect)]
    pub fn find_persons_in_rect(
        &self,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    ) -> Vec<String> {
        owned_ids(self.view.persons_in_rect(min_x, min_y, max_x, max_y))
    }

    /// Find all persons drawn within a radius of a point (lasso selection).
    #[wasm_bindgen(js_name = findPersonsInRadius)]
    pub fn find_persons_in_radius(&self, x: f32, y: f32, radius: f32) -> Vec<String> {
        owned_ids(self.view.persons_in_radius(x, y, radius))
    }

    /// Select the person under the pointer; clears the selection on a miss.
    ///
    /// A hit on a person that is still drawn but no longer in the store
    /// counts as a miss. Returns the selected id, or None.
    #[wasm_bindgen(js_name = selectAt)]
    pub fn select_at(&mut self, x: f32, y: f32, max_distance: f32) -> Option<String> {
        if let Some(id) = self.find_person_at(x, y, max_distance) {
            if self.store.select(&id).is_ok() {
                return Some(id);
            }
        }
        self.store.clear_selection();
        None
    }

    // =========================================================================
    // Relationships
    // =========================================================================

    /// Ids of the known parents of a person, father first.
    #[wasm_bindgen(js_name = parentsOf)]
    pub fn parents_of(&self, id: &str) -> Vec<String> {
        self.store
            .graph()
            .parents(id)
            .into_iter()
            .map(|(_, parent)| parent.to_string())
            .collect()
    }

    #[wasm_bindgen(js_name = childrenOf)]
    pub fn children_of(&self, id: &str) -> Vec<String> {
        owned_ids(self.store.graph().children(id))
    }

    #[wasm_bindgen(js_name = ancestorsOf)]
    pub fn ancestors_of(&self, id: &str) -> Vec<String> {
        owned_ids(self.store.graph().ancestors(id))
    }

    #[wasm_bindgen(js_name = descendantsOf)]
    pub fn descendants_of(&self, id: &str) -> Vec<String> {
        owned_ids(self.store.graph().descendants(id))
    }
}

impl Default for FamilyTreeWasm {
    fn default() -> Self {
        Self::new()
    }
}

fn owned_ids(ids: Vec<&str>) -> Vec<String> {
    ids.into_iter().map(str::to_string).collect()
}
