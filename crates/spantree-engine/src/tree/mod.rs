//! # Span Trees
//!
//! The data layer every rule operates on.
//!
//! - **`span`**: `Span`, a half-open byte range, and slice-style index resolution
//! - **`node`**: `Node`, a tagged sub-range of a shared source with ordered,
//!   non-overlapping children
//! - **`render`**: indented text rendering used by snapshots and the CLI
//! - **`invariants`**: assertions over a whole tree, used by tests

pub mod invariants;
pub mod node;
pub mod render;
pub mod span;

pub use node::{Node, NodeError};
pub use render::render_tree;
pub use span::{Basis, Span, SpanError};
