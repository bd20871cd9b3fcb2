//! Creation plan aggregation
//!
//! Databases sharing (size, replication, throughput) collapse into one
//! reservation bucket whose quantity is the number of databases in it.
//! Sizes are compared as fixed-point integers at the sheet precision, so
//! `1.0004` and `1.0` share a bucket at precision 3 only if they round alike.

use std::collections::BTreeMap;

use crate::types::{CreationPlanEntry, DatabaseSpec, precision_factor, round_to_precision};

/// Grouping key; the size is scaled by `10^precision` and rounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct PlanKey {
    scaled_size: i64,
    replication: bool,
    throughput: u64,
}

/// Aggregate databases into creation plan entries, ordered by ascending
/// (size, replication, throughput)
pub fn aggregate_plan(databases: &[DatabaseSpec], precision: u32) -> Vec<CreationPlanEntry> {
    let factor = precision_factor(precision);
    let mut buckets: BTreeMap<PlanKey, u32> = BTreeMap::new();

    for db in databases {
        let key = PlanKey {
            scaled_size: (db.dataset_size_gb * factor).round() as i64,
            replication: db.replication,
            throughput: db.throughput_ops_per_sec,
        };
        *buckets.entry(key).or_insert(0) += 1;
    }

    buckets
        .into_iter()
        .map(|(key, quantity)| {
            let size = round_to_precision(key.scaled_size as f64 / factor, precision);
            CreationPlanEntry::new(size, key.replication, key.throughput, quantity)
        })
        .collect()
}

/// Total number of databases a plan reserves
pub fn planned_quantity(plan: &[CreationPlanEntry]) -> u64 {
    plan.iter().map(|e| e.quantity as u64).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::{RowTemplate, SizingOptions, normalize_row};
    use crate::sizing::{Cell, ColumnMap};

    #[test]
    fn test_aggregate_groups_identical_shapes() {
        let dbs = vec![
            DatabaseSpec::new("a", 2.0).with_throughput(1000),
            DatabaseSpec::new("b", 1.0),
            DatabaseSpec::new("c", 2.0).with_throughput(1000),
            DatabaseSpec::new("d", 2.0).with_throughput(1000).with_replication(true),
        ];

        let plan = aggregate_plan(&dbs, 3);
        assert_eq!(plan.len(), 3);

        assert_eq!(plan[0].dataset_size_gb, 1.0);
        assert_eq!(plan[0].quantity, 1);

        assert_eq!(plan[1].dataset_size_gb, 2.0);
        assert!(!plan[1].replication);
        assert_eq!(plan[1].throughput_ops_per_sec, 1000);
        assert_eq!(plan[1].quantity, 2);

        assert!(plan[2].replication);
        assert_eq!(plan[2].quantity, 1);
        assert_eq!(plan[2].throughput_measurement_by, "operations-per-second");
    }

    #[test]
    fn test_quantities_are_conserved() {
        let dbs: Vec<DatabaseSpec> = (0..17)
            .map(|i| {
                DatabaseSpec::new(format!("db{}", i), 0.5 + (i % 4) as f64 * 0.25)
                    .with_replication(i % 3 == 0)
                    .with_throughput((i % 2) as u64 * 2500)
            })
            .collect();

        let plan = aggregate_plan(&dbs, 3);
        assert_eq!(planned_quantity(&plan), dbs.len() as u64);
        assert!(plan.iter().all(|e| e.quantity >= 1));
    }

    #[test]
    fn test_sizes_compare_at_precision() {
        let dbs = vec![DatabaseSpec::new("a", 1.0001), DatabaseSpec::new("b", 1.0)];
        assert_eq!(aggregate_plan(&dbs, 3).len(), 1);
        assert_eq!(aggregate_plan(&dbs, 4).len(), 2);
    }

    #[test]
    fn test_sizing_row_to_plan() {
        let columns = ColumnMap {
            name: 0,
            size: 1,
            quantity: Some(2),
            throughput: Some(3),
            replication: Some(4),
            oss_cluster: None,
            modules: None,
        };
        let row: Vec<Cell> = ["cacheA", "2.4", "2", "5000", "true"]
            .iter()
            .map(|c| Cell::from_text(c))
            .collect();

        let template: RowTemplate =
            normalize_row(&row, &columns, &SizingOptions { precision: 0 }).unwrap();
        let dbs = template.expand();

        assert_eq!(dbs.len(), 2);
        assert_eq!(dbs[0].name, "cacheA-1");
        assert_eq!(dbs[1].name, "cacheA-2");
        assert!(dbs.iter().all(|d| d.dataset_size_gb == 2.0 && d.replication));

        let plan = aggregate_plan(&dbs, 0);
        assert_eq!(plan, vec![CreationPlanEntry::new(2.0, true, 5000, 2)]);
    }
}
