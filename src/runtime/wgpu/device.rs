//! WebGPU device implementation.
//!
//! `WgpuDevice` identifies a WebGPU adapter by its enumeration index and
//! caches the adapter properties once a client has been created for it.
//!
//! # Thread Safety
//!
//! `WgpuDevice` is `Clone` and `Send + Sync`. The underlying adapter info
//! is cached on construction.

use std::fmt;
use std::sync::Arc;
use wgpu::{Adapter, Backend};

use crate::error::{Error, Result};

/// Platform index reported in device selection errors.
const PLATFORM_INDEX: usize = crate::runtime::WGPU_PLATFORM;

/// Cached adapter information for a WebGPU device.
#[derive(Clone, Debug)]
pub(crate) struct AdapterInfo {
    /// Adapter name (e.g., "NVIDIA GeForce RTX 4090")
    name: String,
    /// Backend type (Vulkan, Metal, DX12, etc.)
    backend: Backend,
}

/// WebGPU device identifier.
///
/// The device index maps to the order of adapters returned by WebGPU
/// enumeration, which is also the order `-l` lists them in.
#[derive(Clone)]
pub struct WgpuDevice {
    /// Device index (adapter order)
    pub(crate) index: usize,
    /// Cached adapter info (populated once queried)
    info: Option<Arc<AdapterInfo>>,
}

impl WgpuDevice {
    /// Create a device identifier for the specified adapter index.
    ///
    /// This does not initialize the GPU - that happens when `WgpuClient::new`
    /// is called.
    pub fn new(index: usize) -> Self {
        Self { index, info: None }
    }

    pub(crate) fn with_info(index: usize, info: Arc<AdapterInfo>) -> Self {
        Self {
            index,
            info: Some(info),
        }
    }

    /// Get the adapter name.
    ///
    /// Returns "unknown" if the device hasn't been initialized yet.
    pub fn adapter_name(&self) -> String {
        self.info
            .as_ref()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Get the backend type (Vulkan, Metal, DX12, etc.).
    pub fn backend(&self) -> Option<Backend> {
        self.info.as_ref().map(|i| i.backend)
    }
}

impl crate::runtime::Device for WgpuDevice {
    fn id(&self) -> usize {
        self.index
    }

    fn name(&self) -> String {
        match (&self.info, self.backend()) {
            (Some(info), Some(backend)) => format!("{} ({:?})", info.name, backend),
            _ => format!("wgpu:{}", self.index),
        }
    }
}

impl fmt::Debug for WgpuDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WgpuDevice")
            .field("index", &self.index)
            .field("adapter", &self.adapter_name())
            .field("backend", &self.backend())
            .finish()
    }
}

// ============================================================================
// Adapter Discovery
// ============================================================================

fn adapter_info(adapter: &Adapter) -> Arc<AdapterInfo> {
    let wgpu_info = adapter.get_info();
    Arc::new(AdapterInfo {
        name: wgpu_info.name,
        backend: wgpu_info.backend,
    })
}

async fn enumerate_adapters() -> Vec<Adapter> {
    let instance = wgpu::Instance::default();
    instance.enumerate_adapters(wgpu::Backends::all()).await
}

/// Query the adapter at `index`.
///
/// Unlike a high-performance fallback, an out-of-range index is an error so
/// that `-d` never silently runs on a different GPU than requested.
pub(crate) async fn query_adapter_info(index: usize) -> Result<(Adapter, Arc<AdapterInfo>)> {
    let mut adapters = enumerate_adapters().await;

    if index >= adapters.len() {
        return Err(Error::NoDevice {
            platform: PLATFORM_INDEX,
            device: index,
        });
    }

    let adapter = adapters.swap_remove(index);
    let info = adapter_info(&adapter);
    Ok((adapter, info))
}

/// Query adapter information synchronously using pollster.
pub(crate) fn query_adapter_info_blocking(index: usize) -> Result<(Adapter, Arc<AdapterInfo>)> {
    pollster::block_on(query_adapter_info(index))
}

/// Every adapter on this system, with cached info, in index order.
pub(crate) fn enumerate_devices_blocking() -> Vec<WgpuDevice> {
    pollster::block_on(enumerate_adapters())
        .iter()
        .enumerate()
        .map(|(index, adapter)| WgpuDevice::with_info(index, adapter_info(adapter)))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
