//! Value extraction: find the first usable reference string in a value.

use std::collections::HashSet;

use crate::domain::{Node, NodeId, SourceGraph};

/// Field names producers use to carry the reference itself, most likely first.
///
/// The order is observable: reordering changes which string wins.
pub const VALUE_FIELDS: &[&str] = &[
    "filename",
    "file",
    "path",
    "filepath",
    "file_path",
    "fileName",
    "filePath",
    "url",
    "href",
    "uri",
    "download",
    "download_url",
    "downloadUrl",
    "downloadPath",
    "download_path",
    "location",
    "value",
    "data",
    "result",
    "output",
    "link",
];

/// Extract the best reference string from `id` with a fresh revisit guard
pub fn extract_string(graph: &SourceGraph, id: NodeId) -> Option<String> {
    Extractor::new(graph).extract(id)
}

/// One extraction pass. Each container is descended into at most once.
pub struct Extractor<'g> {
    graph: &'g SourceGraph,
    visited: HashSet<NodeId>,
}

impl<'g> Extractor<'g> {
    pub fn new(graph: &'g SourceGraph) -> Self {
        Self {
            graph,
            visited: HashSet::new(),
        }
    }

    /// Trimmed, non-empty string found at or below `id`
    pub fn extract(&mut self, id: NodeId) -> Option<String> {
        let graph = self.graph;
        match graph.node(id)? {
            Node::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Node::Null | Node::Scalar(_) => None,
            Node::Sequence(items) => {
                if !self.visited.insert(id) {
                    return None;
                }
                items.iter().find_map(|item| self.extract(*item))
            }
            Node::Mapping(entries) => {
                if !self.visited.insert(id) {
                    return None;
                }
                self.extract_fields(id, VALUE_FIELDS)
                    .or_else(|| entries.iter().find_map(|(_, child)| self.extract(*child)))
            }
        }
    }

    /// Try each present field of `map` in the given order
    pub fn extract_fields(&mut self, map: NodeId, fields: &[&str]) -> Option<String> {
        let graph = self.graph;
        fields
            .iter()
            .filter_map(|field| graph.get(map, field))
            .find_map(|child| self.extract(child))
    }
}
