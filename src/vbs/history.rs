//! Source history
//!
//! Every version of the source is kept as an immutable [`Iteration`] in an
//! append-only arena. Iterations point to their predecessor and successors by
//! index, so the lineage forms a tree rooted at the first push: jumping back to
//! an earlier iteration and pushing from there forks it. A cursor marks the
//! active iteration, the one routines read from and push after.

pub mod iteration;
pub mod snapshot;
pub mod store;

pub use iteration::{Iteration, IterationId};
pub use snapshot::HistorySnapshot;
pub use store::History;
