//! Relationship edges between laid-out people.
//!
//! Edge ids are derived from kind and endpoints only, so the same input always yields the
//! same edge list:
//!
//! - `parent:{parent}->{child}`
//! - `partner:{first}<->{second}`
//! - `user:{source handle}->{target handle}` (with `#2`, `#3`, … on repeats)

use crate::layout::CoupleKey;
use crate::model::Person;
use rustc_hash::FxHashSet as HashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Attachment point on a person node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Top,
    Bottom,
    Left,
    Right,
}

impl Anchor {
    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::Top => "top",
            Anchor::Bottom => "bottom",
            Anchor::Left => "left",
            Anchor::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle {
    pub node: String,
    pub anchor: Anchor,
}

impl Handle {
    pub fn new(node: impl Into<String>, anchor: Anchor) -> Self {
        Self {
            node: node.into(),
            anchor,
        }
    }

    /// `{node}-{anchor}`, e.g. `3-bottom`.
    pub fn id(&self) -> String {
        format!("{}-{}", self.node, self.anchor.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    ParentChild,
    Partnership,
    UserCreated,
}

impl EdgeKind {
    pub fn style(self) -> EdgeStyle {
        match self {
            EdgeKind::ParentChild => EdgeStyle::Lineage,
            EdgeKind::Partnership => EdgeStyle::Partnership,
            EdgeKind::UserCreated => EdgeStyle::Freeform,
        }
    }
}

/// Stroke intent for the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyle {
    /// Biological lineage, solid stroke.
    Lineage,
    /// Partnership, dashed stroke.
    Partnership,
    /// User-drawn connection, dotted stroke.
    Freeform,
}

impl EdgeStyle {
    /// SVG `stroke-dasharray` value; `None` means solid.
    pub fn dash_array(self) -> Option<&'static str> {
        match self {
            EdgeStyle::Lineage => None,
            EdgeStyle::Partnership => Some("6 4"),
            EdgeStyle::Freeform => Some("2 4"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    pub id: String,
    pub source: String,
    pub source_handle: String,
    pub target: String,
    pub target_handle: String,
    pub kind: EdgeKind,
    pub style: EdgeStyle,
}

impl LayoutEdge {
    fn between(id: String, kind: EdgeKind, source: Handle, target: Handle) -> Self {
        Self {
            id,
            source_handle: source.id(),
            source: source.node,
            target_handle: target.id(),
            target: target.node,
            kind,
            style: kind.style(),
        }
    }

    pub fn parent_child(parent: &str, child: &str) -> Self {
        Self::between(
            format!("parent:{parent}->{child}"),
            EdgeKind::ParentChild,
            Handle::new(parent, Anchor::Bottom),
            Handle::new(child, Anchor::Top),
        )
    }

    pub fn partnership(couple: &CoupleKey) -> Self {
        Self::between(
            format!("partner:{}<->{}", couple.first(), couple.second()),
            EdgeKind::Partnership,
            Handle::new(couple.first(), Anchor::Right),
            Handle::new(couple.second(), Anchor::Left),
        )
    }
}

/// Parent→child edges for every known father and mother (in input order), then one
/// partnership edge per couple.
///
/// A mother id equal to the father id yields a single parent edge.
pub fn build_edges(people: &[Person], couples: &BTreeSet<CoupleKey>) -> Vec<LayoutEdge> {
    let known: HashSet<&str> = people.iter().map(|p| p.id.as_str()).collect();
    let mut edges: Vec<LayoutEdge> = Vec::with_capacity(people.len() * 2 + couples.len());

    for person in people {
        let father = person.father.as_deref();
        // A mother naming the father again would repeat the `parent:` id.
        let mother = person.mother.as_deref().filter(|m| Some(*m) != father);
        for parent in [father, mother].into_iter().flatten() {
            if known.contains(parent) {
                edges.push(LayoutEdge::parent_child(parent, &person.id));
            }
        }
    }

    edges.extend(couples.iter().map(LayoutEdge::partnership));

    tracing::debug!(edges = edges.len(), couples = couples.len(), "built edges");
    edges
}

/// A user-drawn connection whose id cannot collide with generated or existing edges.
pub fn user_edge(existing: &[LayoutEdge], source: Handle, target: Handle) -> LayoutEdge {
    let base = format!("user:{}->{}", source.id(), target.id());
    let taken: HashSet<&str> = existing.iter().map(|e| e.id.as_str()).collect();
    let id = unique_id(&taken, base);
    LayoutEdge::between(id, EdgeKind::UserCreated, source, target)
}

fn unique_id(taken: &HashSet<&str>, base: String) -> String {
    if !taken.contains(base.as_str()) {
        return base;
    }
    for i in 2usize.. {
        let candidate = format!("{base}#{i}");
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
    }
    unreachable!()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_ids_match_node_widget_handles() {
        assert_eq!(Handle::new("3", Anchor::Top).id(), "3-top");
        assert_eq!(Handle::new("3", Anchor::Bottom).id(), "3-bottom");
        assert_eq!(Handle::new("3", Anchor::Left).id(), "3-left");
        assert_eq!(Handle::new("3", Anchor::Right).id(), "3-right");
    }

    #[test]
    fn parent_child_edge_runs_bottom_to_top() {
        let e = LayoutEdge::parent_child("1", "3");
        assert_eq!(e.id, "parent:1->3");
        assert_eq!(e.source, "1");
        assert_eq!(e.source_handle, "1-bottom");
        assert_eq!(e.target, "3");
        assert_eq!(e.target_handle, "3-top");
        assert_eq!(e.style, EdgeStyle::Lineage);
    }

    #[test]
    fn styles_are_distinct_per_kind() {
        assert_eq!(EdgeStyle::Lineage.dash_array(), None);
        assert_ne!(
            EdgeKind::Partnership.style().dash_array(),
            EdgeKind::UserCreated.style().dash_array()
        );
    }

    #[test]
    fn unique_id_appends_counter() {
        let taken: HashSet<&str> = ["x", "x#2"].into_iter().collect();
        assert_eq!(unique_id(&taken, "y".to_string()), "y");
        assert_eq!(unique_id(&taken, "x".to_string()), "x#3");
    }
}
