#![forbid(unsafe_code)]

//! Headless genealogical chart layout.
//!
//! A set of [`Person`] records linked by parent and partner references is turned into a
//! positioned node/edge graph:
//!
//! 1. [`resolve`] assigns each person a generation level from the parent references.
//! 2. [`layout()`] places every person on a row per generation, keeps couples side by side
//!    and centers children under their parents.
//! 3. [`build_edges`] derives parent→child and partner↔partner edges with stable ids.
//!
//! [`chart()`] runs the whole pipeline and is what most callers want.

pub mod chart;
pub mod edges;
pub mod error;
pub mod generations;
pub mod layout;
pub mod model;
pub mod options;

pub use chart::{Chart, chart};
pub use edges::{Anchor, EdgeKind, EdgeStyle, Handle, LayoutEdge, build_edges, user_edge};
pub use error::{Error, InvalidInput, Result};
pub use generations::{Generations, resolve};
pub use layout::{CoupleKey, Layout, LayoutNode, NodeKind, Point, layout};
pub use model::{Gender, Person, PersonIndex, Relation, people_from_json};
pub use options::{LayoutOptions, ReferencePolicy};
