//! Column detection for sizing sheets
//!
//! Sheet authors name their columns every which way ("DB Name", "memoryGB",
//! "Throughput (ops/sec)"). Headers and aliases are both normalized to
//! lowercase alphanumerics; an exact match wins (in alias priority order),
//! then the first header containing an alias.

use anyhow::{Result, bail};

/// Alias lists per logical column, highest priority first
pub mod aliases {
    pub const NAME: &[&str] = &[
        "databasename",
        "database",
        "dbname",
        "db",
        "name",
        "databasenames",
        "database_name",
    ];
    pub const QUANTITY: &[&str] = &["quantity", "qty", "count", "num", "number", "instances"];
    pub const SIZE: &[&str] = &[
        "datasetsizeingb",
        "datasetsizegb",
        "memoryingb",
        "memorygb",
        "memory",
        "sizegb",
        "datasetgb",
        "datasetsize",
        "size",
        "dataset_size_in_gb",
        "dataset_sizegb",
        "dataset_size",
    ];
    pub const THROUGHPUT: &[&str] = &[
        "throughputopssec",
        "throughputopspersec",
        "throughputops",
        "throughput",
        "opssec",
        "opspersec",
        "ops",
    ];
    pub const REPLICATION: &[&str] = &[
        "replication",
        "replicated",
        "isreplicated",
        "replica",
        "replicaenabled",
        "enablereplication",
    ];
    pub const OSS_CLUSTER: &[&str] = &[
        "ossclusterapi",
        "osscluster",
        "supportossclusterapi",
        "support_oss_cluster_api",
        "osscluster_api",
    ];
    pub const MODULES: &[&str] = &["modules", "redis_modules"];
}

/// Lowercase and strip everything but ASCII letters and digits
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Find the column matching one of `candidates`
///
/// Exact normalized matches are tried in candidate order first; then each
/// candidate is looked for as a substring of the normalized headers. When two
/// headers normalize identically the leftmost wins.
pub fn pick_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let candidates: Vec<String> = candidates
        .iter()
        .map(|c| normalize_header(c))
        .filter(|c| !c.is_empty())
        .collect();

    for cand in &candidates {
        if let Some(idx) = normalized.iter().position(|h| h == cand) {
            return Some(idx);
        }
    }

    for cand in &candidates {
        if let Some(idx) = normalized.iter().position(|h| h.contains(cand.as_str())) {
            return Some(idx);
        }
    }

    None
}

/// Resolved positions of the sizing columns in a sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: usize,
    pub size: usize,
    pub quantity: Option<usize>,
    pub throughput: Option<usize>,
    pub replication: Option<usize>,
    pub oss_cluster: Option<usize>,
    pub modules: Option<usize>,
}

impl ColumnMap {
    /// Detect columns from a header row; name and size are required
    pub fn resolve(headers: &[String]) -> Result<Self> {
        let name = pick_column(headers, aliases::NAME);
        let size = pick_column(headers, aliases::SIZE);

        let mut missing = Vec::new();
        if name.is_none() {
            missing.push("database name");
        }
        if size.is_none() {
            missing.push("dataset size (GB)");
        }
        let (Some(name), Some(size)) = (name, size) else {
            bail!(
                "Missing required column(s): {}. Columns seen: {:?}",
                missing.join(", "),
                headers
            );
        };

        Ok(Self {
            name,
            size,
            quantity: pick_column(headers, aliases::QUANTITY),
            throughput: pick_column(headers, aliases::THROUGHPUT),
            replication: pick_column(headers, aliases::REPLICATION),
            oss_cluster: pick_column(headers, aliases::OSS_CLUSTER),
            modules: pick_column(headers, aliases::MODULES),
        })
    }
}
