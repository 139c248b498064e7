//! Integration tests for the end-to-end pipeline
//!
//! Tests verify:
//! - The documented ten-sample scenario
//! - Agreement with a sequential reference over multi-group inputs
//! - Determinism across runs and thread pools
//! - Edge cases (empty, single sample, prime lengths)

mod common;

use common::{SCENARIO, create_cpu_client, synthetic_samples};
use tempstat::error::Error;
use tempstat::histogram::HistogramLayout;
use tempstat::pipeline::Pipeline;
use tempstat::plan::plan_partition;
use tempstat::runtime::cpu::CpuRuntime;
use tempstat::runtime::Kernel;
use tempstat::sample::{Sample, floor_unit};

fn cpu_pipeline() -> Pipeline<CpuRuntime> {
    let (client, _device) = create_cpu_client();
    Pipeline::new(client)
}

/// Sequential min, max, sum
fn reference_stats(samples: &[Sample]) -> (Sample, Sample, i64) {
    let min = *samples.iter().min().unwrap();
    let max = *samples.iter().max().unwrap();
    let sum = samples.iter().map(|&v| i64::from(v)).sum();
    (min, max, sum)
}

// ============================================================================
// Scenario
// ============================================================================

#[test]
fn test_scenario_statistics() {
    let report = cpu_pipeline().run(&SCENARIO).unwrap();

    assert_eq!(report.plan.group_size, 10);
    assert_eq!(report.plan.num_groups, 1);
    assert_eq!(report.stats.min, 40);
    assert_eq!(report.stats.max, 80);
    assert_eq!(report.stats.sum, 615);
    assert_eq!(report.stats.count, 10);
    assert!((report.stats.mean - 61.5).abs() < 1e-12);
    assert_eq!((report.layout.lower, report.layout.upper), (4, 8));
}

#[test]
fn test_scenario_output() {
    let report = cpu_pipeline().run(&SCENARIO).unwrap();
    assert_eq!(
        report.to_string(),
        "Min = 4.0\nMax = 8.0\nAvg = 6.15\n<=5: 4\n6: 3\n7+: 3\n"
    );
}

// ============================================================================
// Reference Agreement
// ============================================================================

#[test]
fn test_multi_group_matches_reference() {
    let samples = synthetic_samples(4096, 7);
    let report = cpu_pipeline().run(&samples).unwrap();

    assert_eq!(report.plan.group_size, 1024);
    assert_eq!(report.plan.num_groups, 4);

    let (min, max, sum) = reference_stats(&samples);
    assert_eq!(report.stats.min, min);
    assert_eq!(report.stats.max, max);
    assert_eq!(report.stats.sum, sum);
    assert!((report.stats.mean - sum as f64 / 4096.0).abs() < 1e-9);
    assert_eq!(report.histogram.total(), 4096);
}

#[test]
fn test_prime_length_uses_unit_groups() {
    let samples = synthetic_samples(1031, 3);
    let report = cpu_pipeline().run(&samples).unwrap();

    assert_eq!(report.plan.group_size, 1);
    assert_eq!(report.plan.num_groups, 1031);
    let (min, max, sum) = reference_stats(&samples);
    assert_eq!((report.stats.min, report.stats.max, report.stats.sum), (min, max, sum));
}

#[test]
fn test_untrimmed_counts_match_reference() {
    let (client, _device) = create_cpu_client();
    let samples = synthetic_samples(3000, 11);
    let (min, max, _) = reference_stats(&samples);
    let layout = HistogramLayout::new(min, max).unwrap();
    let plan = plan_partition(samples.len()).unwrap();

    let uploaded = client.upload(&samples).unwrap();
    let counts = client.bin_samples(&uploaded, &plan, &layout).unwrap();

    let mut expected = vec![0u64; layout.range];
    for &v in &samples {
        expected[(floor_unit(v) - layout.lower) as usize] += 1;
    }
    assert_eq!(counts, expected);
    assert_eq!(counts.iter().sum::<u64>(), 3000);
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_runs_are_deterministic() {
    let samples = synthetic_samples(5000, 42);
    let pipeline = cpu_pipeline();
    let first = pipeline.run(&samples).unwrap();
    let second = pipeline.run(&samples).unwrap();
    assert_eq!(first, second);
}

#[cfg(feature = "rayon")]
#[test]
fn test_dedicated_pool_matches_global_pool() {
    let samples = synthetic_samples(8192, 5);
    let global = cpu_pipeline().run(&samples).unwrap();

    use tempstat::runtime::cpu::{CpuClient, CpuDevice};

    let client = CpuClient::with_num_threads(CpuDevice::new(), 3).unwrap();
    let pooled = Pipeline::<CpuRuntime>::new(client).run(&samples).unwrap();
    assert_eq!(global, pooled);
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn test_empty_input_is_rejected() {
    assert!(matches!(cpu_pipeline().run(&[]), Err(Error::NoSamples)));
}

#[test]
fn test_single_sample() {
    let report = cpu_pipeline().run(&[123]).unwrap();
    assert_eq!(report.plan.group_size, 1);
    assert_eq!(report.plan.num_groups, 1);
    assert_eq!(report.stats.min, report.stats.max);
    assert_eq!(report.histogram.bins().len(), 1);
    assert_eq!(report.histogram.total(), 1);
}

#[test]
fn test_constant_series() {
    let samples = vec![-70; 2048];
    let report = cpu_pipeline().run(&samples).unwrap();
    assert_eq!(report.stats.min, -70);
    assert_eq!(report.stats.max, -70);
    assert!((report.stats.mean + 70.0).abs() < 1e-12);
    assert_eq!(report.histogram.total(), 2048);
}

// ============================================================================
// Backend Parity
// ============================================================================

#[cfg(feature = "wgpu")]
#[test]
fn test_wgpu_matches_cpu() {
    use tempstat::runtime::wgpu::WgpuRuntime;

    let Some((client, _device)) = common::create_wgpu_client() else {
        println!("No GPU available, skipping test");
        return;
    };
    let gpu = Pipeline::<WgpuRuntime>::new(client);

    for (n, seed) in [(10, 1), (1031, 2), (4096, 3), (100_000, 4)] {
        let samples = synthetic_samples(n, seed);
        let expected = cpu_pipeline().run(&samples).unwrap();
        let actual = gpu.run(&samples).unwrap();
        assert_eq!(actual, expected, "wgpu report differs for n={n}");
    }
}
