//! Statistic operations
//!
//! This module defines the operator vocabulary shared by every backend and
//! the host-side stages that consume backend output.
//!
//! ```text
//! RuntimeClient<R>
//!   ├── reduce_groups(op)  ──► PartialResults (one per ReduceOp)
//!   │                              │
//!   │                              ▼
//!   │                     merge::merge_partials ──► GlobalStats
//!   │                                                   │
//!   └── bin_samples(layout) ◄── HistogramLayout ◄───────┘
//! ```

mod reduce;

pub use reduce::{PartialResults, ReduceOp, tree_reduce};
