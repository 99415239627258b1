//! The merge driver: walks candidate sources and builds a canonical mapping.
//!
//! Precedence is traversal order. Sources are visited left to right, and
//! within a mapping direct keys are tried before the format hint, which is
//! tried before nested values. The first reference assigned to a category
//! sticks.

use std::collections::HashSet;

use tracing::debug;

use super::alias::resolve_category;
use super::extract::{extract_string, Extractor, VALUE_FIELDS};
use crate::domain::{CanonicalMapping, Category, Node, NodeId, SourceGraph};

/// Fields whose *value* may name the category of the surrounding mapping
pub const FORMAT_HINT_FIELDS: &[&str] = &["format", "type", "kind", "id", "name", "label"];

/// How a reference reached its category (for logging)
#[derive(Debug, Clone, Copy)]
enum Via {
    Key,
    FormatHint,
    Fallback,
}

/// Builder for one normalization run.
///
/// Owns the in-progress mapping and the set of containers already
/// processed. The set spans every source added to the same normalizer.
pub struct Normalizer<'g> {
    graph: &'g SourceGraph,
    merged: CanonicalMapping,
    visited: HashSet<NodeId>,
}

impl<'g> Normalizer<'g> {
    pub fn new(graph: &'g SourceGraph) -> Self {
        Self {
            graph,
            merged: CanonicalMapping::new(),
            visited: HashSet::new(),
        }
    }

    /// Process one source. `None` stands for an absent source and is skipped.
    pub fn add_source(&mut self, source: Option<NodeId>) -> &mut Self {
        if let Some(id) = source {
            self.process(id, false);
        }
        self
    }

    /// Mapping built so far
    pub fn current(&self) -> &CanonicalMapping {
        &self.merged
    }

    pub fn finish(self) -> CanonicalMapping {
        self.merged
    }

    /// `nested` is true once the walk has passed through a mapping; strings
    /// found there carry no category and are not fallback candidates.
    fn process(&mut self, id: NodeId, nested: bool) {
        let graph = self.graph;
        let Some(node) = graph.node(id) else {
            return;
        };

        match node {
            Node::Null | Node::Scalar(_) => {}
            Node::Text(_) => {
                if !nested {
                    self.assign_fallback(id);
                }
            }
            Node::Sequence(items) => {
                if !self.visited.insert(id) {
                    return;
                }
                for item in items {
                    self.process(*item, nested);
                }
            }
            Node::Mapping(entries) => {
                if !self.visited.insert(id) {
                    return;
                }
                self.process_mapping(id, entries);
            }
        }
    }

    fn process_mapping(&mut self, map: NodeId, entries: &'g [(String, NodeId)]) {
        let graph = self.graph;

        for (key, child) in entries {
            let Some(category) = resolve_category(key) else {
                continue;
            };
            if self.merged.contains(category) {
                continue;
            }
            if let Some(reference) = extract_string(graph, *child) {
                self.assign(category, reference, Via::Key);
            }
        }

        if let Some(category) = self.format_hint(map) {
            if !self.merged.contains(category) {
                let reference = graph
                    .get(map, category.as_str())
                    .and_then(|child| extract_string(graph, child))
                    .or_else(|| {
                        VALUE_FIELDS
                            .iter()
                            .find_map(|field| Extractor::new(graph).extract_fields(map, &[*field]))
                    })
                    .or_else(|| extract_string(graph, map));

                if let Some(reference) = reference {
                    self.assign(category, reference, Via::FormatHint);
                }
            }
        }

        for (_, child) in entries {
            self.process(*child, true);
        }
    }

    /// First hint field present on `map` whose value names a category
    fn format_hint(&self, map: NodeId) -> Option<Category> {
        FORMAT_HINT_FIELDS
            .iter()
            .filter_map(|field| self.graph.get(map, field))
            .filter_map(|child| self.graph.node(child).and_then(Node::as_text))
            .find_map(resolve_category)
    }

    fn assign_fallback(&mut self, id: NodeId) {
        let Some(reference) = extract_string(self.graph, id) else {
            return;
        };
        if let Some(category) = self.merged.first_open() {
            self.assign(category, reference, Via::Fallback);
        }
    }

    fn assign(&mut self, category: Category, reference: String, via: Via) {
        debug!(%category, %reference, ?via, "Assigning reference");
        self.merged.assign_once(category, reference);
    }
}

/// Normalize any number of sources living in one graph
pub fn normalize(graph: &SourceGraph, sources: &[Option<NodeId>]) -> CanonicalMapping {
    let mut normalizer = Normalizer::new(graph);
    for source in sources {
        normalizer.add_source(*source);
    }
    normalizer.finish()
}

/// Normalize JSON documents. JSON `null` counts as an absent source.
pub fn normalize_json<'a, I>(sources: I) -> CanonicalMapping
where
    I: IntoIterator<Item = &'a serde_json::Value>,
{
    let mut graph = SourceGraph::new();
    let roots: Vec<Option<NodeId>> = sources
        .into_iter()
        .map(|value| Some(graph.add_json(value)))
        .collect();
    normalize(&graph, &roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_key() {
        let mapping = normalize_json([&json!({"xlsx": "out.xlsx", "rules_csv": ["out.csv"]})]);
        assert_eq!(mapping.get(Category::Excel), Some("out.xlsx"));
        assert_eq!(mapping.get(Category::Csv), Some("out.csv"));
    }

    #[test]
    fn test_direct_key_without_content_is_skipped() {
        let mapping = normalize_json([&json!({"excel": "", "csv": {"size": 10}})]);
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_format_hint_prefers_field_named_after_category() {
        let value = json!({"type": "xlsx", "path": "generic.bin", "excel": "named.xlsx"});
        let mapping = normalize_json([&value]);
        // The direct key wins first; the hint would have picked the same field.
        assert_eq!(mapping.get(Category::Excel), Some("named.xlsx"));
    }

    #[test]
    fn test_format_hint_skips_unresolvable_hints() {
        let value = json!({"format": "zip", "kind": "CSV", "url": "https://h/r.csv"});
        let mapping = normalize_json([&value]);
        assert_eq!(mapping.get(Category::Csv), Some("https://h/r.csv"));
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_format_hint_value_fields_in_priority_order() {
        // `file` is tried first but holds nothing; `href` outranks `link`
        let value = json!({
            "type": "csv",
            "link": "later.csv",
            "file": {"size": 1},
            "href": "/r.csv"
        });
        let mapping = normalize_json([&value]);
        assert_eq!(mapping.get(Category::Csv), Some("/r.csv"));
    }

    #[test]
    fn test_format_hint_whole_mapping_fallback() {
        // No value-bearing field; the whole mapping is scanned in order.
        let value = json!({"label": "excel", "blob": "report.xlsx"});
        let mapping = normalize_json([&value]);
        assert_eq!(mapping.get(Category::Excel), Some("excel"));
    }

    #[test]
    fn test_format_hint_ignores_non_string_values() {
        let value = json!({"type": 7, "name": ["csv"], "path": "x.csv"});
        assert!(normalize_json([&value]).is_empty());
    }

    #[test]
    fn test_sequence_of_bare_strings_fills_in_order() {
        let mapping = normalize_json([&json!(["a.xlsx", "b.csv", "c.extra"])]);
        assert_eq!(mapping.get(Category::Excel), Some("a.xlsx"));
        assert_eq!(mapping.get(Category::Csv), Some("b.csv"));
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn test_nested_strings_are_not_fallback_candidates() {
        let mapping = normalize_json([&json!({"status": "done", "message": "ok"})]);
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_shared_container_processed_once() {
        let mut graph = SourceGraph::new();
        let shared = graph.mapping();
        let value = graph.text("shared.csv");
        graph.insert(shared, "csv", value).unwrap();

        let mut normalizer = Normalizer::new(&graph);
        normalizer.add_source(Some(shared));
        assert_eq!(normalizer.current().get(Category::Csv), Some("shared.csv"));
        normalizer.add_source(Some(shared)).add_source(None);
        assert_eq!(normalizer.finish().len(), 1);
    }
}
