//! Generation resolution over parent references.
//!
//! A person's generation is one more than the highest generation among the
//! parents that actually exist in the input, or 0 when neither parent does.
//! Roots (founders) sit at generation 0 and every descendant is pushed below
//! its deepest parent.
//!
//! # Algorithm
//!
//! Depth-first with memoization, driven by an explicit work stack so that a
//! long line of descent cannot exhaust the call stack. Each frame walks the
//! father then mother reference of one record:
//!
//! - a parent that is already resolved lifts the frame immediately,
//! - a parent that is still on the active path closes a reference cycle and
//!   contributes 0 without being memoized,
//! - any other parent gets its own frame pushed on top.
//!
//! When a frame has no references left its generation is memoized and folded
//! into the frame below it. Every record is resolved once, so the whole pass
//! is O(persons + references).

use std::collections::HashMap;

use log::{debug, warn};

use crate::model::{Lineage, ParentRole};

/// Generation index per record, as computed by [`resolve_generations`].
#[derive(Debug, Clone, Default)]
pub struct Generations<'a> {
    by_id: HashMap<&'a str, u32>,
    per_record: Vec<u32>,
    cycle_breaks: usize,
    dangling_references: usize,
}

impl<'a> Generations<'a> {
    /// Generation of the person with the given id.
    pub fn get(&self, id: &str) -> Option<u32> {
        self.by_id.get(id).copied()
    }

    /// Generation of the record at `index` in the input slice.
    pub fn of_record(&self, index: usize) -> Option<u32> {
        self.per_record.get(index).copied()
    }

    /// Generations in input order, one per record (duplicates included).
    pub fn per_record(&self) -> &[u32] {
        &self.per_record
    }

    /// Deepest generation present, or None for empty input.
    pub fn max_generation(&self) -> Option<u32> {
        self.per_record.iter().copied().max()
    }

    /// Number of distinct ids resolved.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Iterate over (id, generation) pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, u32)> + '_ {
        self.by_id.iter().map(|(&id, &generation)| (id, generation))
    }

    /// How many times a reference cycle had to be cut.
    pub fn cycle_breaks(&self) -> usize {
        self.cycle_breaks
    }

    /// Parent references that name no record in the input.
    pub fn dangling_references(&self) -> usize {
        self.dangling_references
    }
}

/// One pending record on the work stack.
struct Frame {
    slot: usize,
    /// Next parent reference to visit (0 = father, 1 = mother).
    cursor: usize,
    /// Highest parent generation seen so far; -1 means none.
    best: i64,
}

impl Frame {
    fn new(slot: usize) -> Self {
        Self {
            slot,
            cursor: 0,
            best: -1,
        }
    }

    fn next_parent(&mut self, parents: &[[Option<usize>; 2]]) -> Option<usize> {
        let refs = &parents[self.slot];
        while self.cursor < refs.len() {
            let parent = refs[self.cursor];
            self.cursor += 1;
            if parent.is_some() {
                return parent;
            }
        }
        None
    }

    fn lift(&mut self, generation: u32) {
        self.best = self.best.max(i64::from(generation));
    }

    fn generation(&self) -> u32 {
        // best >= -1, so this is always >= 0
        (self.best + 1) as u32
    }
}

/// Resolve the generation of every record in `persons`.
///
/// Parent references that are absent, empty or unknown count as "no parent".
/// When an id appears more than once, the first record with that id decides
/// its parents and every copy reports the same generation.
pub fn resolve_generations<T: Lineage>(persons: &[T]) -> Generations<'_> {
    let count = persons.len();

    let mut index: HashMap<&str, usize> = HashMap::with_capacity(count);
    for (slot, person) in persons.iter().enumerate() {
        index.entry(person.id()).or_insert(slot);
    }

    // Resolve references to slots up front: [father, mother]
    let mut dangling_references = 0;
    let parents: Vec<[Option<usize>; 2]> = persons
        .iter()
        .map(|person| {
            let mut refs = [None, None];
            for (i, role) in ParentRole::ALL.into_iter().enumerate() {
                let Some(parent_id) = person.parent_id(role).filter(|id| !id.is_empty()) else {
                    continue;
                };
                match index.get(parent_id) {
                    Some(&slot) => refs[i] = Some(slot),
                    None => dangling_references += 1,
                }
            }
            refs
        })
        .collect();

    let mut memo: Vec<Option<u32>> = vec![None; count];
    let mut on_path = vec![false; count];
    let mut stack: Vec<Frame> = Vec::new();
    let mut cycle_breaks = 0;

    for person in persons {
        let start = index[person.id()];
        if memo[start].is_some() {
            continue;
        }

        on_path[start] = true;
        stack.push(Frame::new(start));

        while let Some(frame) = stack.last_mut() {
            if let Some(parent) = frame.next_parent(&parents) {
                if let Some(generation) = memo[parent] {
                    frame.lift(generation);
                } else if on_path[parent] {
                    cycle_breaks += 1;
                    frame.lift(0);
                } else {
                    on_path[parent] = true;
                    stack.push(Frame::new(parent));
                }
            } else {
                let slot = frame.slot;
                let generation = frame.generation();
                stack.pop();
                on_path[slot] = false;
                memo[slot] = Some(generation);
                if let Some(caller) = stack.last_mut() {
                    caller.lift(generation);
                }
            }
        }
    }

    let per_record: Vec<u32> = persons
        .iter()
        .map(|person| memo[index[person.id()]].unwrap_or(0))
        .collect();

    let by_id: HashMap<&str, u32> = index
        .iter()
        .map(|(&id, &slot)| (id, memo[slot].unwrap_or(0)))
        .collect();

    if cycle_breaks > 0 {
        warn!("parent references form a cycle; cut {cycle_breaks} back-reference(s)");
    }
    if dangling_references > 0 {
        warn!("{dangling_references} parent reference(s) name no known person");
    }
    debug!(
        "resolved {} generation(s) for {} record(s)",
        per_record.iter().copied().max().map_or(0, |max| max + 1),
        count
    );

    Generations {
        by_id,
        per_record,
        cycle_breaks,
        dangling_references,
    }
}
