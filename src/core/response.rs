//! Locating download references inside a processing response.
//!
//! The analysis service has published its output files under several
//! keys over time. Sources are gathered from all of them, most specific
//! first, and merged by the normalizer.

use crate::domain::{CanonicalMapping, NodeId, SourceGraph};

use super::merge::normalize;

/// Paths inside a response that may carry download references, in
/// precedence order
pub const RESPONSE_SOURCE_PATHS: &[&[&str]] = &[
    &["downloadUrls"],
    &["outputFiles"],
    &["results", "downloadUrls"],
    &["results", "outputFiles"],
];

/// Gather candidate sources from a response.
///
/// `explicit` is a download map delivered alongside the response (for
/// example by a separate status call); it takes precedence over anything
/// embedded in the response. Missing locations come back as `None`.
pub fn collect_sources(
    graph: &SourceGraph,
    response: Option<NodeId>,
    explicit: Option<NodeId>,
) -> Vec<Option<NodeId>> {
    let mut sources = Vec::with_capacity(RESPONSE_SOURCE_PATHS.len() + 1);
    sources.push(explicit);
    for path in RESPONSE_SOURCE_PATHS {
        sources.push(response.and_then(|root| graph.lookup(root, path)));
    }
    sources
}

/// Normalize the download references of a response
pub fn normalize_response(
    graph: &SourceGraph,
    response: Option<NodeId>,
    explicit: Option<NodeId>,
) -> CanonicalMapping {
    normalize(graph, &collect_sources(graph, response, explicit))
}

/// Failure reported by the service, if the response says the run failed.
///
/// Returns `Some` when `results.success` is absent or not `true`, carrying
/// `results.error` when it is a string.
pub fn response_failure(graph: &SourceGraph, response: NodeId) -> Option<String> {
    use crate::domain::{Node, Scalar};

    let Some(results) = graph.get(response, "results") else {
        return Some("response carries no results".to_string());
    };

    let succeeded = matches!(
        graph.get(results, "success").and_then(|id| graph.node(id)),
        Some(Node::Scalar(Scalar::Bool(true)))
    );
    if succeeded {
        return None;
    }

    let message = graph
        .get(results, "error")
        .and_then(|id| graph.node(id))
        .and_then(Node::as_text)
        .map(str::trim)
        .filter(|msg| !msg.is_empty())
        .unwrap_or("processing did not succeed");
    Some(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use serde_json::json;

    #[test]
    fn test_collect_sources_order() {
        let mut graph = SourceGraph::new();
        let root = graph.add_json(&json!({
            "results": {"outputFiles": {"csv": "c.csv"}},
            "downloadUrls": {"excel": "a.xlsx"}
        }));

        let sources = collect_sources(&graph, Some(root), None);
        assert_eq!(sources.len(), 5);
        assert!(sources[0].is_none());
        assert_eq!(sources[1], graph.get(root, "downloadUrls"));
        assert!(sources[2].is_none());
        assert!(sources[3].is_none());
        assert_eq!(sources[4], graph.lookup(root, &["results", "outputFiles"]));
    }

    #[test]
    fn test_explicit_map_wins() {
        let mut graph = SourceGraph::new();
        let root = graph.add_json(&json!({"downloadUrls": {"excel": "embedded.xlsx"}}));
        let explicit = graph.add_json(&json!({"excel": "explicit.xlsx"}));

        let mapping = normalize_response(&graph, Some(root), Some(explicit));
        assert_eq!(mapping.get(Category::Excel), Some("explicit.xlsx"));
    }

    #[test]
    fn test_unrelated_fields_are_ignored() {
        let mut graph = SourceGraph::new();
        let root = graph.add_json(&json!({
            "filename": "upload.xlsx",
            "results": {"success": true, "excel": "not-a-download-location.xlsx"}
        }));

        assert!(normalize_response(&graph, Some(root), None).is_empty());
    }

    #[test]
    fn test_response_failure() {
        let mut graph = SourceGraph::new();
        let ok = graph.add_json(&json!({"results": {"success": true}}));
        let failed = graph.add_json(&json!({"results": {"success": false, "error": "No rules"}}));
        let missing = graph.add_json(&json!({"status": "done"}));

        assert_eq!(response_failure(&graph, ok), None);
        assert_eq!(response_failure(&graph, failed), Some("No rules".to_string()));
        assert!(response_failure(&graph, missing).is_some());
    }
}
