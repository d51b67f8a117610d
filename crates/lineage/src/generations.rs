//! Generation levels from father/mother references.
//!
//! A person's level is the maximum over their known parents of `parent level + 1`; a person
//! with no known parent is a founder at level 0. Unresolvable parent ids count as absent
//! under [`ReferencePolicy::Lenient`].
//!
//! The traversal is iterative with explicit visitation state, so a cycle in the parent graph
//! surfaces as [`Error::CyclicAncestry`] instead of unbounded recursion.

use crate::error::{Error, Result};
use crate::model::{Person, PersonIndex};
use crate::options::ReferencePolicy;
use rustc_hash::FxHashMap as HashMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Person id → generation level, one entry per input person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Generations {
    levels: BTreeMap<String, u32>,
}

impl Generations {
    pub fn get(&self, id: &str) -> Option<u32> {
        self.levels.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn max_level(&self) -> Option<u32> {
        self.levels.values().copied().max()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.levels.iter().map(|(id, level)| (id.as_str(), *level))
    }
}

impl FromIterator<(String, u32)> for Generations {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        Self {
            levels: iter.into_iter().collect(),
        }
    }
}

/// Computes the generation level of every person in `people`.
pub fn resolve(people: &[Person], policy: ReferencePolicy) -> Result<Generations> {
    let index = PersonIndex::build(people)?;
    index.check_references(policy)?;
    resolve_indexed(&index)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done(u32),
}

pub(crate) fn resolve_indexed(index: &PersonIndex<'_>) -> Result<Generations> {
    let mut state: HashMap<&str, Visit> = HashMap::default();
    state.reserve(index.len());

    for root in index.people() {
        if state.contains_key(root.id.as_str()) {
            continue;
        }

        // Every `InProgress` id is on this stack; the stack is the current parent chain.
        let mut stack: Vec<&Person> = vec![root];
        state.insert(root.id.as_str(), Visit::InProgress);

        while let Some(&person) = stack.last() {
            let mut pending: Option<&Person> = None;
            for parent in index.parents(person) {
                match state.get(parent.id.as_str()) {
                    Some(Visit::Done(_)) => {}
                    Some(Visit::InProgress) => {
                        return Err(cycle_error(&stack, &parent.id));
                    }
                    None => {
                        pending = Some(parent);
                        break;
                    }
                }
            }

            if let Some(parent) = pending {
                state.insert(parent.id.as_str(), Visit::InProgress);
                stack.push(parent);
                continue;
            }

            let level = index
                .parents(person)
                .filter_map(|parent| match state.get(parent.id.as_str()) {
                    Some(Visit::Done(level)) => Some(level + 1),
                    _ => None,
                })
                .max()
                .unwrap_or(0);
            state.insert(person.id.as_str(), Visit::Done(level));
            stack.pop();
        }
    }

    let generations: Generations = index
        .people()
        .filter_map(|person| match state.get(person.id.as_str()) {
            Some(Visit::Done(level)) => Some((person.id.clone(), *level)),
            _ => None,
        })
        .collect();

    tracing::debug!(
        people = generations.len(),
        max_level = generations.max_level().unwrap_or(0),
        "resolved generation levels"
    );
    Ok(generations)
}

fn cycle_error(stack: &[&Person], repeated: &str) -> Error {
    let start = stack
        .iter()
        .position(|p| p.id == repeated)
        .unwrap_or_default();
    let mut cycle: Vec<String> = stack[start..].iter().map(|p| p.id.clone()).collect();
    cycle.push(repeated.to_string());
    Error::CyclicAncestry { cycle }
}
