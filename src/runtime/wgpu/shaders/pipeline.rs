//! WGSL compute pipeline infrastructure
//!
//! Provides pipeline caching and dispatch utilities for WGSL compute shaders.
//! Shader sources are validated with naga before they reach the device, so a
//! malformed module surfaces as `Error::Build` carrying the diagnostics.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingType, Buffer, BufferBindingType, ComputePipeline,
    ComputePipelineDescriptor, Device, PipelineLayoutDescriptor, ShaderModule,
    ShaderModuleDescriptor, ShaderSource, ShaderStages,
};

use crate::error::{Error, Result};

/// Invocations per workgroup for every statistics shader
pub const WORKGROUP_SIZE: u32 = 256;

// ============================================================================
// Pipeline Cache
// ============================================================================

/// Cache for shader modules, compute pipelines and bind group layouts
pub struct PipelineCache {
    device: Arc<Device>,
    /// Cached shader modules by name
    modules: Mutex<HashMap<&'static str, Arc<ShaderModule>>>,
    /// Cached pipelines by (shader_name, entry_point)
    pipelines: Mutex<HashMap<(&'static str, &'static str), Arc<ComputePipeline>>>,
    /// Cached bind group layouts by layout key
    layouts: Mutex<HashMap<LayoutKey, Arc<BindGroupLayout>>>,
}

/// Key for bind group layout cache
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayoutKey {
    /// Number of storage buffers in the layout
    pub num_storage_buffers: u32,
    /// Number of uniform buffers in the layout
    pub num_uniform_buffers: u32,
}

/// Parse and validate a WGSL module, returning the diagnostics on failure.
pub(crate) fn validate_wgsl(name: &'static str, source: &str) -> Result<()> {
    let module = wgpu::naga::front::wgsl::parse_str(source).map_err(|e| Error::Build {
        entry_point: name,
        log: e.emit_to_string(source),
    })?;

    wgpu::naga::valid::Validator::new(
        wgpu::naga::valid::ValidationFlags::all(),
        wgpu::naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| Error::Build {
        entry_point: name,
        log: format!("{:?}", e.into_inner()),
    })?;

    Ok(())
}

impl PipelineCache {
    /// Create a new pipeline cache
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            modules: Mutex::new(HashMap::new()),
            pipelines: Mutex::new(HashMap::new()),
            layouts: Mutex::new(HashMap::new()),
        }
    }

    /// Get or create a shader module.
    ///
    /// The source is only generated and validated on a cache miss.
    pub fn get_or_create_module(
        &self,
        name: &'static str,
        source: impl FnOnce() -> String,
    ) -> Result<Arc<ShaderModule>> {
        let mut modules = self.modules.lock();
        if let Some(module) = modules.get(name) {
            return Ok(module.clone());
        }

        let source = source();
        if let Err(e) = validate_wgsl(name, &source) {
            tracing::error!(module = name, "shader build failed");
            return Err(e);
        }

        let module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });
        tracing::debug!(module = name, "shader module built");

        let module = Arc::new(module);
        modules.insert(name, module.clone());
        Ok(module)
    }

    /// Get or create a compute pipeline
    pub fn get_or_create_pipeline(
        &self,
        shader_name: &'static str,
        entry_point: &'static str,
        module: &ShaderModule,
        layout: &BindGroupLayout,
    ) -> Arc<ComputePipeline> {
        let key = (shader_name, entry_point);
        let mut pipelines = self.pipelines.lock();

        if let Some(pipeline) = pipelines.get(&key) {
            return pipeline.clone();
        }

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some(&format!("{}_layout", shader_name)),
                bind_group_layouts: &[layout],
                immediate_size: 0,
            });

        let pipeline = self
            .device
            .create_compute_pipeline(&ComputePipelineDescriptor {
                label: Some(&format!("{}_{}", shader_name, entry_point)),
                layout: Some(&pipeline_layout),
                module,
                entry_point: Some(entry_point),
                compilation_options: Default::default(),
                cache: None,
            });

        let pipeline = Arc::new(pipeline);
        pipelines.insert(key, pipeline.clone());
        pipeline
    }

    /// Get or create a bind group layout: storage buffers first, then uniforms
    pub fn get_or_create_layout(&self, key: LayoutKey) -> Arc<BindGroupLayout> {
        let mut layouts = self.layouts.lock();

        if let Some(layout) = layouts.get(&key) {
            return layout.clone();
        }

        let mut entries = Vec::new();

        for i in 0..key.num_storage_buffers {
            entries.push(BindGroupLayoutEntry {
                binding: i,
                visibility: ShaderStages::COMPUTE,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Storage { read_only: false },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            });
        }

        for i in 0..key.num_uniform_buffers {
            entries.push(BindGroupLayoutEntry {
                binding: key.num_storage_buffers + i,
                visibility: ShaderStages::COMPUTE,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            });
        }

        let layout = self
            .device
            .create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some("stats_layout"),
                entries: &entries,
            });

        let layout = Arc::new(layout);
        layouts.insert(key, layout.clone());
        layout
    }

    /// Create a bind group from buffers
    pub fn create_bind_group(&self, layout: &BindGroupLayout, buffers: &[&Buffer]) -> BindGroup {
        let entries: Vec<BindGroupEntry> = buffers
            .iter()
            .enumerate()
            .map(|(i, buffer)| BindGroupEntry {
                binding: i as u32,
                resource: buffer.as_entire_binding(),
            })
            .collect();

        self.device.create_bind_group(&BindGroupDescriptor {
            label: Some("stats_bind_group"),
            layout,
            entries: &entries,
        })
    }
}

// ============================================================================
// Dispatch Helpers
// ============================================================================

/// Lay `num_groups` workgroups out on a 2D grid.
///
/// Returns `(x, y)` with `x <= max_per_dimension`; shaders recover the
/// work-group index as `id.x + id.y * grid.x` and skip the overhang.
pub fn dispatch_grid(
    op: &'static str,
    num_groups: usize,
    max_per_dimension: u32,
) -> Result<(u32, u32)> {
    if num_groups == 0 || max_per_dimension == 0 {
        return Err(Error::dispatch(op, "empty dispatch grid"));
    }
    let max = max_per_dimension as usize;
    let x = num_groups.min(max);
    let y = num_groups.div_ceil(x);
    if y > max {
        return Err(Error::dispatch(
            op,
            format!("{num_groups} work-groups exceed a {max}x{max} dispatch grid"),
        ));
    }
    Ok((x as u32, y as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_grid_fits_one_row() {
        assert_eq!(dispatch_grid("value_min", 4, 65535).unwrap(), (4, 1));
        assert_eq!(dispatch_grid("value_min", 65535, 65535).unwrap(), (65535, 1));
    }

    #[test]
    fn test_dispatch_grid_wraps_rows() {
        assert_eq!(dispatch_grid("value_max", 65536, 65535).unwrap(), (65535, 2));
        assert_eq!(dispatch_grid("value_max", 10, 4).unwrap(), (4, 3));
    }

    #[test]
    fn test_dispatch_grid_rejects_oversized() {
        assert!(matches!(
            dispatch_grid("value_avg", 17, 4),
            Err(Error::Dispatch { op: "value_avg", .. })
        ));
        assert!(dispatch_grid("value_avg", 0, 4).is_err());
    }

    #[test]
    fn test_validate_wgsl_reports_build_log() {
        let result = validate_wgsl("broken", "fn main( {");
        match result {
            Err(Error::Build { entry_point, log }) => {
                assert_eq!(entry_point, "broken");
                assert!(!log.is_empty());
            }
            other => panic!("expected build error, got {other:?}"),
        }
    }
}
