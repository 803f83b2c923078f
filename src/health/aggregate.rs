//! Health sample aggregation.
//!
//! Transforms raw per-node health records into a grouped snapshot with
//! stable node numbering and staleness classification relative to the
//! best block height seen in the same sample.

/// One node's health at one sample instant, as reported by the bucket
/// health endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeHealthRecord {
    pub provider: String,
    pub region: String,
    pub latency_ms: f64,
    /// Reported chain height. Zero means the node failed to answer.
    pub height: u64,
}

impl NodeHealthRecord {
    /// A height of zero marks a node that failed to answer meaningfully.
    pub fn failed(&self) -> bool {
        self.height == 0
    }
}

/// Probe outcome for a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Success,
    Failure,
}

impl NodeStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            NodeStatus::Success => "SUCCESS",
            NodeStatus::Failure => "FAILURE",
        }
    }
}

/// How far a node's reported height trails the best height in the sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalenessTier {
    Current,
    Lagging,
    Stale,
}

impl StalenessTier {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            StalenessTier::Current => "current",
            StalenessTier::Lagging => "lagging",
            StalenessTier::Stale => "stale",
        }
    }
}

/// Height windows for staleness classification.
///
/// A node is `Current` while its height is within `current_window` of the
/// best height in the sample, `Lagging` while within `lagging_window`, and
/// `Stale` beyond that.
#[derive(Debug, Clone)]
pub struct TierThresholds {
    pub current_window: u64,
    pub lagging_window: u64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            current_window: 25,
            lagging_window: 100,
        }
    }
}

impl TierThresholds {
    /// Classify a successful node's height against the sample maximum.
    pub fn classify(&self, height: u64, height_max: u64) -> StalenessTier {
        if height + self.current_window >= height_max {
            StalenessTier::Current
        } else if height + self.lagging_window >= height_max {
            StalenessTier::Lagging
        } else {
            StalenessTier::Stale
        }
    }
}

/// A health record enriched with its position within its (provider, region)
/// group and a staleness tier.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedHealthRow {
    pub provider: String,
    pub region: String,
    /// 1-based ordinal within the (provider, region) group, stable for a
    /// fixed input set.
    pub node_index: usize,
    pub latency_ms: f64,
    pub height: u64,
    pub status: NodeStatus,
    /// `None` for failed nodes, which are never compared for staleness.
    pub tier: Option<StalenessTier>,
}

/// The full aggregated sample, ready for rendering.
///
/// Built fresh each poll tick, immutable once built, discarded after render.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthSnapshot {
    /// Human label derived from the probe URL (chain name + bucket id),
    /// or the raw URL when the path does not parse.
    pub label: String,
    pub source_url: String,
    /// Best height among non-failed records; zero when every node failed.
    pub height_max: u64,
    pub rows: Vec<GroupedHealthRow>,
}

/// Group records by (provider, region) and classify staleness.
///
/// Rows come out sorted by (provider, region) ascending, ties kept in input
/// order so `node_index` assignment is deterministic. Failed records stay in
/// the output so operators can see coverage gaps.
pub fn aggregate(
    mut records: Vec<NodeHealthRecord>,
    source_url: &str,
    thresholds: &TierThresholds,
) -> HealthSnapshot {
    // Vec::sort_by is stable, which the node numbering relies on.
    records.sort_by(|a, b| {
        a.provider
            .cmp(&b.provider)
            .then_with(|| a.region.cmp(&b.region))
    });

    let height_max = records.iter().map(|r| r.height).max().unwrap_or(0);

    let mut rows = Vec::with_capacity(records.len());
    let mut last_key: Option<(String, String)> = None;
    let mut node_index = 0;

    for record in records {
        let key = (record.provider.clone(), record.region.clone());
        if last_key.as_ref() == Some(&key) {
            node_index += 1;
        } else {
            node_index = 1;
        }
        last_key = Some(key);

        let (status, tier) = if record.failed() {
            (NodeStatus::Failure, None)
        } else {
            (
                NodeStatus::Success,
                Some(thresholds.classify(record.height, height_max)),
            )
        };

        rows.push(GroupedHealthRow {
            provider: record.provider,
            region: record.region,
            node_index,
            latency_ms: record.latency_ms,
            height: record.height,
            status,
            tier,
        });
    }

    HealthSnapshot {
        label: derive_label(source_url),
        source_url: source_url.to_string(),
        height_max,
        rows,
    }
}

/// Derive a display label from a bucket URL of the form
/// `https://<host>/<chain-slug>/v1/<bucket-id>/health`.
///
/// Falls back to the raw URL when the path does not have that shape.
fn derive_label(url: &str) -> String {
    let parts: Vec<&str> = url.split('/').collect();
    if parts.len() > 5 && !parts[3].is_empty() && !parts[5].is_empty() {
        let chain = parts[3]
            .split('-')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ");
        format!("{} - {}", chain, parts[5])
    } else {
        url.to_string()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
