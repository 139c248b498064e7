//! Global client cache for WebGPU runtime

use super::client::WgpuClient;
use super::device::WgpuDevice;
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Global client cache: device index -> cached WgpuClient
///
/// This caches WgpuClient instances per device to avoid creating new
/// WebGPU devices and queues for every pipeline run.
static CLIENT_CACHE: OnceLock<Mutex<HashMap<usize, WgpuClient>>> = OnceLock::new();

/// Get or create a cached WgpuClient for a device.
///
/// Only one `wgpu::Device` exists per adapter index, so compiled pipelines
/// are shared by every client handed out for it.
pub(super) fn get_or_create_client(device: &WgpuDevice) -> Result<WgpuClient> {
    let cache = CLIENT_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache_guard = cache.lock();

    if let Some(client) = cache_guard.get(&device.index) {
        return Ok(client.clone());
    }

    let client = WgpuClient::new(device.clone())?;
    cache_guard.insert(device.index, client.clone());

    Ok(client)
}
