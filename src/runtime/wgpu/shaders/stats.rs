//! Statistics WGSL kernel launchers
//!
//! Launchers record compute passes into a caller-owned encoder so the client
//! can batch the min, max and sum passes into one submission.

use wgpu::{Buffer, CommandEncoder};

use super::pipeline::{LayoutKey, PipelineCache, dispatch_grid};
use super::stats_wgsl::{generate_hist_shader, generate_reduce_shader};
use crate::error::Result;
use crate::ops::ReduceOp;

const REDUCE_MODULE: &str = "stats_reduce";
const HIST_MODULE: &str = "stats_hist";
const HIST_ENTRY: &str = "value_hist";

/// Uniform parameters shared by all statistics shaders
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StatsParams {
    /// Samples per work-group
    pub group_size: u32,
    /// Work-groups in the plan
    pub num_groups: u32,
    /// Histogram bins (0 for reductions)
    pub range: u32,
    /// Histogram offset in whole units (0 for reductions)
    pub lower: i32,
}

const STATS_LAYOUT: LayoutKey = LayoutKey {
    num_storage_buffers: 2,
    num_uniform_buffers: 1,
};

#[allow(clippy::too_many_arguments)]
fn encode_pass(
    cache: &PipelineCache,
    encoder: &mut CommandEncoder,
    module_name: &'static str,
    source: fn() -> String,
    entry_point: &'static str,
    buffers: &[&Buffer],
    num_groups: usize,
    max_per_dimension: u32,
) -> Result<()> {
    let (x, y) = dispatch_grid(entry_point, num_groups, max_per_dimension)?;

    let module = cache.get_or_create_module(module_name, source)?;
    let layout = cache.get_or_create_layout(STATS_LAYOUT);
    let pipeline = cache.get_or_create_pipeline(module_name, entry_point, &module, &layout);
    let bind_group = cache.create_bind_group(&layout, buffers);

    let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
        label: Some(entry_point),
        timestamp_writes: None,
    });
    pass.set_pipeline(&pipeline);
    pass.set_bind_group(0, Some(&bind_group), &[]);
    // One workgroup per work-group of samples
    pass.dispatch_workgroups(x, y, 1);
    Ok(())
}

/// Record one grouped reduction pass writing one `i32` per work-group.
#[allow(clippy::too_many_arguments)]
pub fn encode_reduce(
    cache: &PipelineCache,
    encoder: &mut CommandEncoder,
    op: ReduceOp,
    input: &Buffer,
    output: &Buffer,
    params_buffer: &Buffer,
    num_groups: usize,
    max_per_dimension: u32,
) -> Result<()> {
    encode_pass(
        cache,
        encoder,
        REDUCE_MODULE,
        generate_reduce_shader,
        op.entry_point(),
        &[input, output, params_buffer],
        num_groups,
        max_per_dimension,
    )
}

/// Record the histogram pass into zero-initialised `bins`.
pub fn encode_histogram(
    cache: &PipelineCache,
    encoder: &mut CommandEncoder,
    input: &Buffer,
    bins: &Buffer,
    params_buffer: &Buffer,
    num_groups: usize,
    max_per_dimension: u32,
) -> Result<()> {
    encode_pass(
        cache,
        encoder,
        HIST_MODULE,
        generate_hist_shader,
        HIST_ENTRY,
        &[input, bins, params_buffer],
        num_groups,
        max_per_dimension,
    )
}
