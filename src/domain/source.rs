//! Source values as an arena-backed graph.
//!
//! Containers refer to their children by `NodeId`, so one container can be
//! reachable from several parents (or from itself). Traversals use the id
//! as container identity when guarding against revisits.

use thiserror::Error;

/// Handle to a node inside a `SourceGraph`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Inert scalar. Never yields a reference and never resolves to a category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
}

/// A single source value
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Absent / null
    Null,

    /// Number or boolean
    Scalar(Scalar),

    /// String
    Text(String),

    /// Ordered children
    Sequence(Vec<NodeId>),

    /// Keyed children in insertion order
    Mapping(Vec<(String, NodeId)>),
}

impl Node {
    /// String content, if this is a text node
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Errors raised while assembling a graph by hand
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Node {0} does not exist in this graph")]
    UnknownNode(NodeId),

    #[error("Node {0} is not a sequence")]
    NotASequence(NodeId),

    #[error("Node {0} is not a mapping")]
    NotAMapping(NodeId),
}

/// Arena holding every node reachable from a set of sources
#[derive(Debug, Clone, Default)]
pub struct SourceGraph {
    nodes: Vec<Node>,
}

impl SourceGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes allocated
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node has been allocated
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn ensure(&self, id: NodeId) -> Result<(), GraphError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(id))
        }
    }

    pub fn null(&mut self) -> NodeId {
        self.alloc(Node::Null)
    }

    pub fn scalar(&mut self, scalar: Scalar) -> NodeId {
        self.alloc(Node::Scalar(scalar))
    }

    pub fn text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::Text(text.into()))
    }

    /// Allocate an empty sequence
    pub fn sequence(&mut self) -> NodeId {
        self.alloc(Node::Sequence(Vec::new()))
    }

    /// Allocate an empty mapping
    pub fn mapping(&mut self) -> NodeId {
        self.alloc(Node::Mapping(Vec::new()))
    }

    /// Append `child` to the sequence `seq`
    pub fn push(&mut self, seq: NodeId, child: NodeId) -> Result<(), GraphError> {
        self.ensure(child)?;
        match self.nodes.get_mut(seq.0) {
            Some(Node::Sequence(items)) => {
                items.push(child);
                Ok(())
            }
            Some(_) => Err(GraphError::NotASequence(seq)),
            None => Err(GraphError::UnknownNode(seq)),
        }
    }

    /// Set `key` on the mapping `map`.
    ///
    /// An existing key keeps its position and gets the new value.
    pub fn insert(
        &mut self,
        map: NodeId,
        key: impl Into<String>,
        child: NodeId,
    ) -> Result<(), GraphError> {
        self.ensure(child)?;
        let key = key.into();
        match self.nodes.get_mut(map.0) {
            Some(Node::Mapping(entries)) => {
                if let Some(entry) = entries.iter_mut().find(|(k, _)| *k == key) {
                    entry.1 = child;
                } else {
                    entries.push((key, child));
                }
                Ok(())
            }
            Some(_) => Err(GraphError::NotAMapping(map)),
            None => Err(GraphError::UnknownNode(map)),
        }
    }

    /// Value stored under `key`, if `map` is a mapping that has it
    pub fn get(&self, map: NodeId, key: &str) -> Option<NodeId> {
        self.entries(map)
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, id)| *id)
    }

    /// Descend through nested mappings one key at a time
    pub fn lookup(&self, root: NodeId, path: &[&str]) -> Option<NodeId> {
        path.iter()
            .try_fold(root, |current, key| self.get(current, key))
    }

    /// Entries of a mapping (empty for anything else)
    pub fn entries(&self, map: NodeId) -> &[(String, NodeId)] {
        match self.node(map) {
            Some(Node::Mapping(entries)) => entries,
            _ => &[],
        }
    }

    /// Copy a JSON document into the graph, returning its root
    pub fn add_json(&mut self, value: &serde_json::Value) -> NodeId {
        use serde_json::Value;

        match value {
            Value::Null => self.null(),
            Value::Bool(b) => self.scalar(Scalar::Bool(*b)),
            Value::Number(n) => self.scalar(Scalar::Number(n.as_f64().unwrap_or_default())),
            Value::String(s) => self.text(s.as_str()),
            Value::Array(items) => {
                let children: Vec<NodeId> = items.iter().map(|item| self.add_json(item)).collect();
                self.alloc(Node::Sequence(children))
            }
            Value::Object(map) => {
                let entries: Vec<(String, NodeId)> = map
                    .iter()
                    .map(|(key, item)| (key.clone(), self.add_json(item)))
                    .collect();
                self.alloc(Node::Mapping(entries))
            }
        }
    }

    /// Copy a YAML document into the graph, returning its root.
    ///
    /// Tags are dropped, scalar keys are stringified and complex keys are
    /// skipped.
    pub fn add_yaml(&mut self, value: &serde_yaml::Value) -> NodeId {
        use serde_yaml::Value;

        match value {
            Value::Null => self.null(),
            Value::Bool(b) => self.scalar(Scalar::Bool(*b)),
            Value::Number(n) => self.scalar(Scalar::Number(n.as_f64().unwrap_or_default())),
            Value::String(s) => self.text(s.as_str()),
            Value::Sequence(items) => {
                let children: Vec<NodeId> = items.iter().map(|item| self.add_yaml(item)).collect();
                self.alloc(Node::Sequence(children))
            }
            Value::Mapping(map) => {
                let mut entries: Vec<(String, NodeId)> = Vec::with_capacity(map.len());
                for (key, item) in map {
                    let key = match key {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        Value::Bool(b) => b.to_string(),
                        _ => continue,
                    };
                    let child = self.add_yaml(item);
                    entries.push((key, child));
                }
                self.alloc(Node::Mapping(entries))
            }
            Value::Tagged(tagged) => self.add_yaml(&tagged.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_json_preserves_key_order() {
        let mut graph = SourceGraph::new();
        let root = graph.add_json(&json!({"zeta": 1, "alpha": "a", "mid": [true]}));

        let keys: Vec<&str> = graph.entries(root).iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);

        let alpha = graph.get(root, "alpha").unwrap();
        assert_eq!(graph.node(alpha).unwrap().as_text(), Some("a"));
    }

    #[test]
    fn test_add_yaml_stringifies_scalar_keys() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("1: one\ntrue: yes\nname: !tag csv\n").unwrap();
        let mut graph = SourceGraph::new();
        let root = graph.add_yaml(&yaml);

        assert!(graph.get(root, "1").is_some());
        assert!(graph.get(root, "true").is_some());
        let name = graph.get(root, "name").unwrap();
        assert_eq!(graph.node(name).unwrap().as_text(), Some("csv"));
    }

    #[test]
    fn test_self_reference() {
        let mut graph = SourceGraph::new();
        let map = graph.mapping();
        graph.insert(map, "me", map).unwrap();

        assert_eq!(graph.get(map, "me"), Some(map));
        assert_eq!(graph.lookup(map, &["me", "me", "me"]), Some(map));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut graph = SourceGraph::new();
        let map = graph.mapping();
        let a = graph.text("a");
        let b = graph.text("b");
        let c = graph.text("c");
        graph.insert(map, "first", a).unwrap();
        graph.insert(map, "second", b).unwrap();
        graph.insert(map, "first", c).unwrap();

        let entries = graph.entries(map);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ("first".to_string(), c));
    }

    #[test]
    fn test_builder_errors() {
        let mut graph = SourceGraph::new();
        let text = graph.text("x");
        let seq = graph.sequence();

        assert_eq!(graph.push(text, seq), Err(GraphError::NotASequence(text)));
        assert_eq!(
            graph.insert(seq, "k", text),
            Err(GraphError::NotAMapping(seq))
        );
        assert_eq!(
            graph.push(seq, NodeId(99)),
            Err(GraphError::UnknownNode(NodeId(99)))
        );
    }
}
