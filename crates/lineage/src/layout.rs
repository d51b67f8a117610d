//! Coordinate assignment.
//!
//! Stages, each returning a fresh node list:
//!
//! 1. group people into one row per generation level, ascending;
//! 2. order each row by date of birth (ties by id);
//! 3. place rows left to right, keeping mutual partners side by side;
//! 4. center children of a placed father and mother under the couple's midpoint, one
//!    generation at a time so grandchildren follow their re-centered parents;
//! 5. nudge later nodes sideways out of any remaining overlap.
//!
//! Sibling groups wider than `max_siblings_per_row` wrap onto extra rows, packed tighter when
//! needed so they never reach the next generation row. Rows packed closer than `node_height`
//! are left to stage 5.
//!
//! Stage 5 is a greedy pairwise pass. It is deterministic, but dense collisions can leave
//! overlaps behind.

use crate::error::{InvalidInput, Result};
use crate::generations::Generations;
use crate::model::{Person, PersonIndex};
use crate::options::LayoutOptions;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Person,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    pub id: String,
    pub label: String,
    pub position: Point,
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

impl LayoutNode {
    fn for_person(person: &Person, position: Point) -> Self {
        Self {
            id: person.id.clone(),
            label: person.label(),
            position,
            kind: NodeKind::Person,
        }
    }
}

/// Unordered pair of mutually declared partners, stored with the smaller id first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoupleKey {
    first: String,
    second: String,
}

impl CoupleKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn contains(&self, id: &str) -> bool {
        self.first == id || self.second == id
    }
}

impl fmt::Display for CoupleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.first, self.second)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub nodes: Vec<LayoutNode>,
    /// Couples that were placed side by side. Couples on different rows are not listed;
    /// see [`PersonIndex::couples`] for the full set.
    pub couples: BTreeSet<CoupleKey>,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Lays out `people` using precomputed generation levels.
///
/// Every person must have an entry in `generations`.
pub fn layout(
    people: &[Person],
    generations: &Generations,
    options: &LayoutOptions,
) -> Result<Layout> {
    let index = PersonIndex::build(people)?;
    index.check_references(options.reference_policy)?;
    layout_indexed(&index, generations, options)
}

pub(crate) fn layout_indexed(
    index: &PersonIndex<'_>,
    generations: &Generations,
    options: &LayoutOptions,
) -> Result<Layout> {
    let rows = group_by_generation(index, generations)?;
    let rows: Vec<(u32, Vec<&Person>)> = rows
        .into_iter()
        .map(|(level, row)| (level, sort_by_birth(row)))
        .collect();
    let Layout { nodes, couples } = place_rows(index, &rows, options);
    let nodes = center_children(index, generations, nodes, options);
    let nodes = resolve_overlaps(nodes, options);

    tracing::debug!(
        nodes = nodes.len(),
        rows = rows.len(),
        couples = couples.len(),
        "laid out chart"
    );
    Ok(Layout { nodes, couples })
}

fn by_birth(a: &Person, b: &Person) -> Ordering {
    a.dob.cmp(&b.dob).then_with(|| a.id.cmp(&b.id))
}

fn group_by_generation<'a>(
    index: &PersonIndex<'a>,
    generations: &Generations,
) -> Result<Vec<(u32, Vec<&'a Person>)>> {
    let mut rows: BTreeMap<u32, Vec<&'a Person>> = BTreeMap::new();
    for person in index.people() {
        let Some(level) = generations.get(&person.id) else {
            return Err(InvalidInput::MissingGeneration {
                id: person.id.clone(),
            }
            .into());
        };
        rows.entry(level).or_default().push(person);
    }
    Ok(rows.into_iter().collect())
}

fn sort_by_birth(mut row: Vec<&Person>) -> Vec<&Person> {
    row.sort_by(|a, b| by_birth(a, b));
    row
}

fn place_rows(
    index: &PersonIndex<'_>,
    rows: &[(u32, Vec<&Person>)],
    options: &LayoutOptions,
) -> Layout {
    let mut nodes: Vec<LayoutNode> = Vec::with_capacity(index.len());
    let mut couples: BTreeSet<CoupleKey> = BTreeSet::new();

    for (level, row) in rows {
        let y = f64::from(*level) * options.row_height;
        let members: HashSet<&str> = row.iter().map(|p| p.id.as_str()).collect();
        let mut consumed: HashSet<&str> = HashSet::default();
        let mut x = 0.0;

        for person in row {
            if !consumed.insert(person.id.as_str()) {
                continue;
            }
            nodes.push(LayoutNode::for_person(person, Point { x, y }));

            let partner = person
                .partners
                .iter()
                .filter(|id| members.contains(id.as_str()) && !consumed.contains(id.as_str()))
                .filter_map(|id| index.get(id))
                .find(|partner| partner.declares_partner(&person.id));

            match partner {
                Some(partner) => {
                    consumed.insert(partner.id.as_str());
                    nodes.push(LayoutNode::for_person(
                        partner,
                        Point {
                            x: x + options.partner_offset(),
                            y,
                        },
                    ));
                    couples.insert(CoupleKey::new(&person.id, &partner.id));
                    x += options.couple_advance();
                }
                None => {
                    if !person.partners.is_empty() {
                        tracing::trace!(person = %person.id, "no mutual partner on this row");
                    }
                    x += options.single_advance();
                }
            }
        }
    }

    Layout { nodes, couples }
}

fn center_children(
    index: &PersonIndex<'_>,
    generations: &Generations,
    nodes: Vec<LayoutNode>,
    options: &LayoutOptions,
) -> Vec<LayoutNode> {
    let mut positions: HashMap<String, Point> =
        nodes.iter().map(|n| (n.id.clone(), n.position)).collect();

    // Keyed by the children's level first so parents are final before their children move.
    let mut families: BTreeMap<(u32, &str, &str), Vec<&Person>> = BTreeMap::new();
    for person in index.people() {
        let (Some(father), Some(mother)) = (person.father.as_deref(), person.mother.as_deref())
        else {
            continue;
        };
        if !(positions.contains_key(father) && positions.contains_key(mother)) {
            continue;
        }
        let level = generations.get(&person.id).unwrap_or_default();
        families
            .entry((level, father, mother))
            .or_default()
            .push(person);
    }

    let per_row = options.max_siblings_per_row.max(1);
    for ((_, father, mother), mut children) in families {
        let (Some(f), Some(m)) = (positions.get(father), positions.get(mother)) else {
            continue;
        };
        let midpoint = (f.x + m.x) / 2.0;
        children.sort_by(|a, b| by_birth(a, b));

        let step = wrap_step(children.len().div_ceil(per_row), options);
        for (row, chunk) in children.chunks(per_row).enumerate() {
            let center = (chunk.len() - 1) as f64 / 2.0;
            let dy = row as f64 * step;
            for (i, child) in chunk.iter().enumerate() {
                let Some(slot) = positions.get_mut(child.id.as_str()) else {
                    continue;
                };
                slot.x = midpoint + (i as f64 - center) * options.sibling_spacing();
                slot.y += dy;
            }
        }
    }

    nodes
        .into_iter()
        .map(|mut node| {
            if let Some(position) = positions.get(&node.id) {
                node.position = *position;
            }
            node
        })
        .collect()
}

/// Vertical step between wrapped sibling rows. Tightened when needed so the last wrapped
/// row still ends above the next generation row.
fn wrap_step(rows: usize, options: &LayoutOptions) -> f64 {
    if rows <= 1 {
        return 0.0;
    }
    let room = (options.row_height - options.node_height).max(0.0);
    options.sibling_row_offset().min(room / (rows - 1) as f64)
}

fn resolve_overlaps(mut nodes: Vec<LayoutNode>, options: &LayoutOptions) -> Vec<LayoutNode> {
    let (width, height) = (options.node_width, options.node_height);
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let a = nodes[i].position;
            let b = nodes[j].position;
            let dx = b.x - a.x;
            if dx.abs() >= width || (b.y - a.y).abs() >= height {
                continue;
            }
            let x = if dx >= 0.0 { a.x + width } else { a.x - width };
            tracing::trace!(node = %nodes[j].id, from = b.x, to = x, "nudged overlapping node");
            nodes[j].position.x = x;
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn couple_key_is_order_independent() {
        assert_eq!(CoupleKey::new("b", "a"), CoupleKey::new("a", "b"));
        let key = CoupleKey::new("7", "12");
        assert_eq!(key.first(), "12");
        assert_eq!(key.second(), "7");
        assert_eq!(key.to_string(), "12+7");
        assert!(key.contains("7"));
        assert!(!key.contains("1"));
    }

    fn node(id: &str, x: f64, y: f64) -> LayoutNode {
        LayoutNode {
            id: id.to_string(),
            label: id.to_string(),
            position: Point { x, y },
            kind: NodeKind::Person,
        }
    }

    #[test]
    fn resolve_overlaps_pushes_later_node_by_minimum_distance() {
        let options = LayoutOptions::default();
        let nodes = resolve_overlaps(
            vec![node("a", 100.0, 0.0), node("b", 150.0, 10.0)],
            &options,
        );
        assert_eq!(nodes[0].position, Point { x: 100.0, y: 0.0 });
        assert_eq!(nodes[1].position, Point { x: 280.0, y: 10.0 });
    }

    #[test]
    fn resolve_overlaps_pushes_left_when_later_node_is_left() {
        let options = LayoutOptions::default();
        let nodes = resolve_overlaps(
            vec![node("a", 100.0, 0.0), node("b", 40.0, 0.0)],
            &options,
        );
        assert_eq!(nodes[1].position.x, -80.0);
    }

    #[test]
    fn wrap_step_stays_within_the_generation_band() {
        let options = LayoutOptions::default();
        assert_eq!(wrap_step(1, &options), 0.0);
        assert_eq!(wrap_step(2, &options), 80.0);
        assert_eq!(wrap_step(3, &options), 70.0);
        let step = wrap_step(5, &options);
        assert_eq!(step, 35.0);
        assert!(4.0 * step + options.node_height <= options.row_height);
    }

    #[test]
    fn resolve_overlaps_ignores_nodes_on_other_rows() {
        let options = LayoutOptions::default();
        let nodes = resolve_overlaps(
            vec![node("a", 0.0, 0.0), node("b", 0.0, 200.0)],
            &options,
        );
        assert_eq!(nodes[1].position, Point { x: 0.0, y: 200.0 });
    }
}
