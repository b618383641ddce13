//! Topology Pre-Analyzer
//!
//! Pure diagram → facts derivation run before any prompt is built.

use std::collections::{BTreeMap, HashSet};

use super::models::{Edge, Node, Recommendation, TopologyFacts, TopologyIssue};

/// Derive structured facts from a diagram
pub fn analyze(nodes: &[Node], edges: &[Edge]) -> TopologyFacts {
    let device_count = nodes.len();
    let connection_count = edges.len();

    let mut potential_issues = Vec::new();
    if device_count == 0 {
        potential_issues.push(TopologyIssue::NoDevices);
    }
    if connection_count == 0 && device_count > 1 {
        potential_issues.push(TopologyIssue::DevicesNotConnected);
    }
    if has_duplicate_connection(edges) {
        potential_issues.push(TopologyIssue::DuplicateConnection);
    }

    let mut recommendations = Vec::new();
    if device_count > 0 {
        recommendations.push(Recommendation::VerifyDeviceConfiguration);
    }
    if connection_count > 0 {
        recommendations.push(Recommendation::ReviewLinkPerformance);
    }

    TopologyFacts::new(
        device_count,
        connection_count,
        tally_device_types(nodes),
        potential_issues,
        recommendations,
    )
}

/// Count nodes per device type name
pub fn tally_device_types(nodes: &[Node]) -> BTreeMap<String, usize> {
    nodes.iter().fold(BTreeMap::new(), |mut acc, node| {
        *acc.entry(node.device_type.as_str().to_string()).or_insert(0) += 1;
        acc
    })
}

/// Endpoint pairs are compared unordered; scanning stops at the first repeat.
fn has_duplicate_connection(edges: &[Edge]) -> bool {
    let mut seen = HashSet::with_capacity(edges.len());
    edges.iter().any(|edge| {
        let a = edge.source.as_deref();
        let b = edge.target.as_deref();
        let pair = if a <= b { (a, b) } else { (b, a) };
        !seen.insert(pair)
    })
}
