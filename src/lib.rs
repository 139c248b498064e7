//! # tempstat
//!
//! **Partitioned parallel statistics over fixed-point temperature samples.**
//!
//! tempstat computes min, max and mean of a temperature series together with
//! a one-unit histogram whose 1% tails are collapsed, with the same pipeline
//! on the CPU and on WebGPU.
//!
//! ## Pipeline
//!
//! - **Plan**: split `n` samples into equal work-groups of at most 1024
//! - **Reduce**: one tree reduction per work-group for min, max and sum
//! - **Merge**: fold the per-group partials on the host
//! - **Histogram**: atomic binning, then tail trimming
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tempstat::prelude::*;
//!
//! let device = CpuRuntime::default_device();
//! let pipeline = Pipeline::<CpuRuntime>::new(CpuRuntime::default_client(&device)?);
//! let report = pipeline.run(&[50, 60, 55, 70, 65, 40, 80, 75, 58, 62])?;
//! print!("{report}");
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): Multi-threaded CPU passes
//! - `wgpu`: Cross-platform GPU via WebGPU

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod histogram;
pub mod ingest;
pub mod merge;
pub mod ops;
pub mod pipeline;
pub mod plan;
pub mod report;
pub mod runtime;
pub mod sample;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::histogram::{HistogramLayout, TrimmedHistogram};
    pub use crate::ingest::{Ingested, parse_records, read_path};
    pub use crate::merge::GlobalStats;
    pub use crate::pipeline::Pipeline;
    pub use crate::plan::{PartitionPlan, plan_partition};
    pub use crate::report::Report;
    pub use crate::runtime::cpu::CpuRuntime;
    pub use crate::runtime::{Device, Runtime, RuntimeClient};
    pub use crate::sample::{SCALE_FACTOR, Sample};

    #[cfg(feature = "wgpu")]
    pub use crate::runtime::wgpu::WgpuRuntime;
}
