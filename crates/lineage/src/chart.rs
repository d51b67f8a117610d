//! End-to-end pipeline: records in, positioned nodes and edges out.

use crate::edges::{Handle, LayoutEdge, build_edges, user_edge};
use crate::error::{InvalidInput, Result};
use crate::generations::resolve_indexed;
use crate::layout::{LayoutNode, layout_indexed};
use crate::model::{Person, PersonIndex};
use crate::options::LayoutOptions;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Chart {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
}

/// Resolves generations, lays out nodes and builds edges in one pass.
///
/// The person index is built once and shared by every stage. On error nothing is returned;
/// there is no partially laid out chart.
pub fn chart(people: &[Person], options: &LayoutOptions) -> Result<Chart> {
    let index = PersonIndex::build(people)?;
    index.check_references(options.reference_policy)?;

    let generations = resolve_indexed(&index)?;
    let layout = layout_indexed(&index, &generations, options)?;
    // Side-by-side placement only covers couples sharing a row; edges cover every couple.
    let edges = build_edges(people, &index.couples());

    Ok(Chart {
        nodes: layout.nodes,
        edges,
    })
}

impl Chart {
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&LayoutEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Appends a user-drawn connection between two nodes of this chart.
    pub fn connect(&mut self, source: Handle, target: Handle) -> Result<&LayoutEdge> {
        for handle in [&source, &target] {
            if self.node(&handle.node).is_none() {
                return Err(InvalidInput::UnknownNode {
                    handle: handle.id(),
                }
                .into());
            }
        }
        let edge = user_edge(&self.edges, source, target);
        tracing::debug!(edge = %edge.id, "added user connection");
        let at = self.edges.len();
        self.edges.push(edge);
        Ok(&self.edges[at])
    }
}
