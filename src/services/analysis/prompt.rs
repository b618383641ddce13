//! Context renderer
//!
//! Turns pre-analysis facts and the diagram, as submitted, into the JSON
//! document that is appended to the prompt. Issue and recommendation text
//! follows the prompt language.

use serde_json::{Map, Value, json};

use crate::services::topology::{Edge, Node, TopologyFacts};
use crate::utils::Locale;

pub fn render_context(
    locale: Locale,
    facts: &TopologyFacts,
    nodes: &[Node],
    edges: &[Edge],
) -> Result<Value, serde_json::Error> {
    let issues: Vec<&str> = facts
        .potential_issues()
        .iter()
        .map(|issue| issue.describe(locale))
        .collect();
    let recommendations: Vec<&str> = facts
        .recommendations()
        .iter()
        .map(|rec| rec.describe(locale))
        .collect();

    let analysis = json!({
        "device_count": facts.device_count(),
        "connection_count": facts.connection_count(),
        "device_types": serde_json::to_value(facts.device_types())?,
        "potential_issues": issues,
        "recommendations": recommendations,
    });

    let mut context = Map::new();
    context.insert("analysis".to_string(), analysis);
    context.insert(
        "nodes".to_string(),
        Value::Array(nodes.iter().map(|node| node.raw().clone()).collect()),
    );
    context.insert(
        "edges".to_string(),
        Value::Array(edges.iter().map(|edge| edge.raw().clone()).collect()),
    );
    Ok(Value::Object(context))
}
