//! Integration tests for partition planning and the host merge

mod common;

use common::{create_cpu_client, synthetic_samples};
use tempstat::error::Error;
use tempstat::merge::merge_partials;
use tempstat::ops::ReduceOp;
use tempstat::plan::{MAX_GROUP_SIZE, PartitionPlan, plan_partition, plan_partition_with_limit};
use tempstat::runtime::Kernel;

#[test]
fn test_plan_is_largest_divisor() {
    for n in [1usize, 2, 999, 1024, 1025, 2048, 6000, 65_536, 1_000_003] {
        let plan = plan_partition(n).unwrap();
        assert_eq!(plan.total_samples(), n);
        assert!(plan.group_size >= 1 && plan.group_size <= MAX_GROUP_SIZE);
        let larger = (plan.group_size + 1..=MAX_GROUP_SIZE.min(n)).find(|g| n % g == 0);
        assert_eq!(larger, None, "n={n} has a larger divisor than {}", plan.group_size);
    }
}

#[test]
fn test_plan_respects_client_limit() {
    let plan = plan_partition_with_limit(4096, 100).unwrap();
    assert_eq!(plan.group_size, 64);
    assert_eq!(plan.num_groups, 64);
}

#[test]
fn test_plan_rejects_empty() {
    assert!(matches!(plan_partition(0), Err(Error::NoSamples)));
}

#[test]
fn test_merge_is_partition_independent() {
    let (client, _device) = create_cpu_client();
    let samples = synthetic_samples(6000, 9);
    let uploaded = client.upload(&samples).unwrap();

    let mut merged = Vec::new();
    for group_size in [1, 8, 250, 1000] {
        let plan = PartitionPlan {
            group_size,
            num_groups: samples.len() / group_size,
        };
        let [min, max, sum] = client.reduce_all(&uploaded, &plan).unwrap();
        assert_eq!(min.len(), plan.num_groups);
        merged.push(merge_partials(&min, &max, &sum, samples.len()).unwrap());
    }
    assert!(merged.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_reduce_rejects_uncovered_plan() {
    let (client, _device) = create_cpu_client();
    let samples = synthetic_samples(100, 1);
    let uploaded = client.upload(&samples).unwrap();
    let plan = PartitionPlan {
        group_size: 30,
        num_groups: 3,
    };
    assert!(matches!(
        client.reduce_groups(ReduceOp::Min, &uploaded, &plan),
        Err(Error::InvalidArgument { arg: "plan", .. })
    ));
}

#[test]
fn test_reduce_rejects_oversized_group() {
    let (client, _device) = create_cpu_client();
    let samples = synthetic_samples(2048, 1);
    let uploaded = client.upload(&samples).unwrap();
    let plan = PartitionPlan {
        group_size: 2048,
        num_groups: 1,
    };
    assert!(matches!(
        client.reduce_groups(ReduceOp::Max, &uploaded, &plan),
        Err(Error::Dispatch { op: "value_max", .. })
    ));
}
