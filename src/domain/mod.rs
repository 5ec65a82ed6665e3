//! Domain-level structures shared by both line detectors.
//!
//! These are plain data types: ruling line segments and groups, line masks,
//! cell bounding boxes, skew estimates, and the row/column layout derived from
//! a set of cells. None of them outlives a single `detect_all_cells` call.

pub mod lines;
pub mod table;

pub use lines::*;
pub use table::*;
