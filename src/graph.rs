//! Trigger graph construction.
//!
//! Builds directed edges from invocation sources (public HTTP, event bus) to
//! compute targets out of serverless scanner findings, and derives the
//! public-reachability set: compute targets callable without an
//! intermediating event.

use crate::models::{Finding, TriggerEdge};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Source node marking direct public HTTP invocation.
pub const PUBLIC_HTTP_SOURCE: &str = "http:public";

/// Source node marking event-bus mediated invocation.
pub const EVENT_BUS_SOURCE: &str = "eventbus:demo";

/// Namespace prefix for compute target nodes.
pub const COMPUTE_PREFIX: &str = "lambda:";

/// Serialized graph document, node/edge lists with stable ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub surface: String,
}

/// Derive trigger edges from serverless findings. Trigger surface findings
/// carry an HTTP or event marker in their message; everything else is not an
/// invocation edge.
pub fn edges_from_findings(serverless_findings: &[Finding]) -> Vec<TriggerEdge> {
    let mut edges = Vec::new();
    for f in serverless_findings {
        if f.message.contains("HTTP-triggered") {
            edges.push(TriggerEdge {
                source: PUBLIC_HTTP_SOURCE.to_string(),
                target: format!("{}{}", COMPUTE_PREFIX, f.subject_id),
                meta: [("surface".to_string(), "public".to_string())].into(),
            });
        }
        if f.message.contains("Event-triggered") {
            edges.push(TriggerEdge {
                source: EVENT_BUS_SOURCE.to_string(),
                target: format!("{}{}", COMPUTE_PREFIX, f.subject_id),
                meta: [("surface".to_string(), "event".to_string())].into(),
            });
        }
    }
    edges
}

/// Materialize the serializable graph document. Node order follows first
/// appearance in the edge list so re-runs on identical input serialize
/// byte-identically.
pub fn build_graph(edges: &[TriggerEdge]) -> TriggerGraph {
    let mut seen = BTreeSet::new();
    let mut nodes = Vec::new();
    for e in edges {
        if seen.insert(e.source.clone()) {
            nodes.push(GraphNode {
                id: e.source.clone(),
                kind: "trigger".to_string(),
            });
        }
        if seen.insert(e.target.clone()) {
            nodes.push(GraphNode {
                id: e.target.clone(),
                kind: "compute".to_string(),
            });
        }
    }

    let edges = edges
        .iter()
        .map(|e| GraphEdge {
            source: e.source.clone(),
            target: e.target.clone(),
            surface: e
                .meta
                .get("surface")
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
        })
        .collect();

    TriggerGraph { nodes, edges }
}

/// Compute targets reachable from the public HTTP source, with the compute
/// namespace prefix stripped.
pub fn public_targets(edges: &[TriggerEdge]) -> BTreeSet<String> {
    edges
        .iter()
        .filter(|e| e.source == PUBLIC_HTTP_SOURCE)
        .map(|e| {
            e.target
                .strip_prefix(COMPUTE_PREFIX)
                .unwrap_or(&e.target)
                .to_string()
        })
        .collect()
}
