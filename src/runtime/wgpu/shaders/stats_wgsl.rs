//! WGSL shader source for the statistics passes
//!
//! Two modules are generated:
//! - `stats_reduce`: `value_min`, `value_max`, `value_avg`, one work-group
//!   reduction per dispatched workgroup
//! - `stats_hist`: `value_hist`, atomic per-bin counting
//!
//! A workgroup of `WORKGROUP_SIZE` invocations covers one work-group of
//! `group_size <= 1024` samples by striding, then folds the per-invocation
//! accumulators with a shared-memory tree. The dispatch grid is 2D so that
//! more than 65535 work-groups can be addressed.

use super::pipeline::WORKGROUP_SIZE;
use crate::ops::ReduceOp;
use crate::sample::SCALE_FACTOR;

/// Shared uniform block, mirrored by `StatsParams` on the host.
fn params_struct() -> &'static str {
    r#"
struct StatsParams {
    group_size: u32,
    num_groups: u32,
    range: u32,
    lower: i32,
}
"#
}

/// Identity element written as a WGSL `i32` expression.
fn identity_value(op: ReduceOp) -> &'static str {
    match op {
        ReduceOp::Min => "2147483647",
        // i32::MIN has no literal form that survives negation
        ReduceOp::Max => "(-2147483647 - 1)",
        ReduceOp::Sum => "0",
    }
}

fn combine_expr(op: ReduceOp, a: &str, b: &str) -> String {
    match op {
        ReduceOp::Min => format!("min({a}, {b})"),
        ReduceOp::Max => format!("max({a}, {b})"),
        ReduceOp::Sum => format!("{a} + {b}"),
    }
}

fn generate_reduce_entry(op: ReduceOp) -> String {
    let name = op.entry_point();
    let identity = identity_value(op);
    let strided = combine_expr(op, "acc", "stats_input[base + i]");
    let folded = combine_expr(op, "stats_shared[tid]", "stats_shared[tid + s]");

    format!(
        r#"
@compute @workgroup_size({WORKGROUP_SIZE})
fn {name}(@builtin(local_invocation_id) local_id: vec3<u32>,
          @builtin(workgroup_id) group_id: vec3<u32>,
          @builtin(num_workgroups) grid: vec3<u32>) {{
    let tid = local_id.x;
    let group = group_id.x + group_id.y * grid.x;

    if (group >= stats_params.num_groups) {{
        return;
    }}

    let base = group * stats_params.group_size;
    var acc: i32 = {identity};
    var i: u32 = tid;
    while (i < stats_params.group_size) {{
        acc = {strided};
        i = i + WORKGROUP_SIZE;
    }}

    stats_shared[tid] = acc;
    workgroupBarrier();

    for (var s: u32 = WORKGROUP_SIZE / 2u; s > 0u; s = s >> 1u) {{
        if (tid < s) {{
            stats_shared[tid] = {folded};
        }}
        workgroupBarrier();
    }}

    if (tid == 0u) {{
        stats_output[group] = stats_shared[0];
    }}
}}
"#
    )
}

/// Generate the module holding the three reduction entry points.
pub fn generate_reduce_shader() -> String {
    let mut source = format!(
        r#"
const WORKGROUP_SIZE: u32 = {WORKGROUP_SIZE}u;

var<workgroup> stats_shared: array<i32, {WORKGROUP_SIZE}>;
{params}
@group(0) @binding(0) var<storage, read_write> stats_input: array<i32>;
@group(0) @binding(1) var<storage, read_write> stats_output: array<i32>;
@group(0) @binding(2) var<uniform> stats_params: StatsParams;
"#,
        params = params_struct(),
    );
    for op in ReduceOp::ALL {
        source.push_str(&generate_reduce_entry(op));
    }
    source
}

/// Generate the histogram module (`value_hist`).
///
/// Samples outside `0..range` after offsetting are skipped; the host checks
/// that the bin total equals the sample count.
pub fn generate_hist_shader() -> String {
    format!(
        r#"
const WORKGROUP_SIZE: u32 = {WORKGROUP_SIZE}u;
const SCALE_FACTOR: i32 = {SCALE_FACTOR};
{params}
@group(0) @binding(0) var<storage, read_write> hist_input: array<i32>;
@group(0) @binding(1) var<storage, read_write> hist_bins: array<atomic<u32>>;
@group(0) @binding(2) var<uniform> hist_params: StatsParams;

// Integer division in WGSL truncates toward zero
fn floor_unit(v: i32) -> i32 {{
    let q = v / SCALE_FACTOR;
    if (v % SCALE_FACTOR < 0) {{
        return q - 1;
    }}
    return q;
}}

@compute @workgroup_size({WORKGROUP_SIZE})
fn value_hist(@builtin(local_invocation_id) local_id: vec3<u32>,
              @builtin(workgroup_id) group_id: vec3<u32>,
              @builtin(num_workgroups) grid: vec3<u32>) {{
    let tid = local_id.x;
    let group = group_id.x + group_id.y * grid.x;

    if (group >= hist_params.num_groups) {{
        return;
    }}

    let base = group * hist_params.group_size;
    var i: u32 = tid;
    while (i < hist_params.group_size) {{
        let bin = floor_unit(hist_input[base + i]) - hist_params.lower;
        if (bin >= 0 && u32(bin) < hist_params.range) {{
            atomicAdd(&hist_bins[u32(bin)], 1u);
        }}
        i = i + WORKGROUP_SIZE;
    }}
}}
"#,
        params = params_struct(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(source: &str) {
        let module = match wgpu::naga::front::wgsl::parse_str(source) {
            Ok(m) => m,
            Err(e) => panic!("WGSL parse error:\n{}", e.emit_to_string(source)),
        };
        let mut validator = wgpu::naga::valid::Validator::new(
            wgpu::naga::valid::ValidationFlags::all(),
            wgpu::naga::valid::Capabilities::empty(),
        );
        if let Err(e) = validator.validate(&module) {
            panic!("WGSL validation error: {e:?}");
        }
    }

    #[test]
    fn test_reduce_shader_is_valid_wgsl() {
        let source = generate_reduce_shader();
        validate(&source);
        for op in ReduceOp::ALL {
            assert!(source.contains(&format!("fn {}(", op.entry_point())));
        }
    }

    #[test]
    fn test_hist_shader_is_valid_wgsl() {
        let source = generate_hist_shader();
        validate(&source);
        assert!(source.contains("fn value_hist("));
    }
}
