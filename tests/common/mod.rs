//! Common test utilities
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempstat::runtime::Runtime;
use tempstat::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
#[cfg(feature = "wgpu")]
use tempstat::runtime::wgpu::{WgpuClient, WgpuDevice, WgpuRuntime};
use tempstat::sample::Sample;

/// The ten-sample scenario used throughout the docs
pub const SCENARIO: [Sample; 10] = [50, 60, 55, 70, 65, 40, 80, 75, 58, 62];

/// Create a CPU client and device for testing
pub fn create_cpu_client() -> (CpuClient, CpuDevice) {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device).expect("CPU client is infallible");
    (client, device)
}

/// Create a WebGPU client and device, returning None if WebGPU is unavailable
#[cfg(feature = "wgpu")]
pub fn create_wgpu_client() -> Option<(WgpuClient, WgpuDevice)> {
    if !tempstat::runtime::wgpu::is_wgpu_available() {
        return None;
    }
    let device = WgpuDevice::new(0);
    let client = WgpuRuntime::default_client(&device).ok()?;
    Some((client, device))
}

/// Seeded pseudo-random temperatures in `-300..=400` (scaled)
pub fn synthetic_samples(n: usize, seed: u64) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(-300..=400)).collect()
}

/// Render one weather record line
pub fn record_line(location: &str, day: u32, temperature: &str) -> String {
    format!("{location} 2006 1 {day} 0 {temperature}")
}
