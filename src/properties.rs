//! [crate::properties] contains the basic building blocks for assembling and manipulating a
//! [crate::graph::PipelineGraph]: node and edge identifiers, node kinds, edge provenance, and the
//! node/edge records themselves.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    borrow::Borrow,
    collections::BTreeMap,
    fmt::{Display, Formatter},
};

/// Prefix reserved for edges owned by the synchronizer.
pub const AUTO_EDGE_PREFIX: &str = "auto-";

/// Prefix for edges created through a connect gesture.
pub const MANUAL_EDGE_PREFIX: &str = "edge-";

/// Port on a source node that auto edges leave from.
pub const AUTO_SOURCE_PORT: &str = "value";

/// Port on a template node that auto edges arrive at.
pub const AUTO_TARGET_PORT: &str = "variable-input";

/// Field name → value map carried by every node.
pub type NodeData = BTreeMap<String, Value>;

/// Stable node identifier. Doubles as the name other nodes use in `{{ }}` references, so it is
/// never changed after the node is created.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> NodeId {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Handle id for one of this node's ports, following the `{node}-{port}` convention.
    pub fn handle(&self, port: &str) -> String {
        format!("{}-{}", self.0, port)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId(id)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> EdgeId {
        EdgeId(id.into())
    }

    /// Deterministic id of the auto edge `source -> target`. Recomputing it for the same pair
    /// always yields the same id, which keeps reconciliation idempotent.
    pub fn auto(source: &NodeId, target: &NodeId) -> EdgeId {
        EdgeId(format!("{AUTO_EDGE_PREFIX}{source}-{target}"))
    }

    /// Id of a manual edge, derived from the full connection so that repeating the same connect
    /// gesture maps onto the same edge.
    pub fn manual(connection: &Connection) -> EdgeId {
        EdgeId(format!(
            "{MANUAL_EDGE_PREFIX}{}-{}-{}-{}",
            connection.source,
            connection.source_handle.as_deref().unwrap_or_default(),
            connection.target,
            connection.target_handle.as_deref().unwrap_or_default(),
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn has_auto_prefix(&self) -> bool {
        self.0.starts_with(AUTO_EDGE_PREFIX)
    }
}

impl Display for EdgeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(id: &str) -> Self {
        EdgeId(id.to_string())
    }
}

impl Borrow<str> for EdgeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// [NodeKind] enumerates the closed set of node types a pipeline can contain. Per-kind behavior
/// (ports, form fields, defaults) lives in [crate::schema].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// A named pipeline input. Its id is what text templates reference.
    #[default]
    Input,
    /// A named pipeline output
    Output,
    /// A language model call with system and prompt inputs
    Llm,
    /// A text template whose `{{ }}` references drive auto edges
    Text,
    /// Splits data into passed/failed branches
    Filter,
    /// Applies a string operation
    Transform,
    /// Combines several inputs into one
    Aggregator,
    /// Validates data against a rule
    Validator,
    /// Delays execution
    Delay,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Who owns an edge. Manual edges belong to the user; auto edges belong to the synchronizer and
/// are the only ones it may create or remove.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    #[default]
    Manual,
    Auto,
}

impl Display for Provenance {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Provenance::Manual => write!(f, "manual"),
            Provenance::Auto => write!(f, "auto"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Position {
        Position { x, y }
    }
}

/// A graph vertex: a data source or a text template.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
}

impl PipelineNode {
    /// Create a node whose data is populated from the kind's default field values.
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> PipelineNode {
        PipelineNode {
            id: id.into(),
            kind,
            position: Position::default(),
            data: kind.default_data(),
        }
    }

    pub fn with_position(mut self, position: Position) -> PipelineNode {
        self.position = position;
        self
    }

    pub fn with_field(mut self, field: &str, value: impl Into<Value>) -> PipelineNode {
        self.data.insert(field.to_string(), value.into());
        self
    }

    pub fn field(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// The template text of this node, if its kind carries one and the field holds a string.
    pub fn template_text(&self) -> Option<&str> {
        self.kind
            .template_field()
            .and_then(|field| self.data.get(field))
            .and_then(Value::as_str)
    }
}

impl Display for PipelineNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.id)
    }
}

/// A user connect gesture, before it becomes an [Edge].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl Connection {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Connection {
        Connection {
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn with_handles(
        mut self,
        source_handle: impl Into<String>,
        target_handle: impl Into<String>,
    ) -> Connection {
        self.source_handle = Some(source_handle.into());
        self.target_handle = Some(target_handle.into());
        self
    }
}

/// A directed connection `source -> target`. The holder of the reference (the template node) is
/// the target; the node being read from is the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default)]
    pub provenance: Provenance,
}

impl Edge {
    /// Build the manual edge for a connect gesture.
    pub fn manual(connection: &Connection) -> Edge {
        Edge {
            id: EdgeId::manual(connection),
            source: connection.source.clone(),
            target: connection.target.clone(),
            source_handle: connection.source_handle.clone(),
            target_handle: connection.target_handle.clone(),
            provenance: Provenance::Manual,
        }
    }

    /// Build the synchronizer-owned edge `source -> target`. Only reconciliation mints these.
    pub(crate) fn auto(source: &NodeId, target: &NodeId) -> Edge {
        Edge {
            id: EdgeId::auto(source, target),
            source: source.clone(),
            target: target.clone(),
            source_handle: Some(source.handle(AUTO_SOURCE_PORT)),
            target_handle: Some(target.handle(AUTO_TARGET_PORT)),
            provenance: Provenance::Auto,
        }
    }

    /// Re-key an imported edge so that its id agrees with its provenance. Auto edges get
    /// [EdgeId::auto] of their endpoints and the auto handles; manual edges lose the reserved
    /// `auto-` prefix and are re-keyed from their connection.
    pub(crate) fn normalized(self) -> Edge {
        match self.provenance {
            Provenance::Auto if self.id != EdgeId::auto(&self.source, &self.target) => {
                Edge::auto(&self.source, &self.target)
            }
            Provenance::Manual if self.id.has_auto_prefix() => Edge::manual(&Connection {
                source: self.source,
                target: self.target,
                source_handle: self.source_handle,
                target_handle: self.target_handle,
            }),
            _ => self,
        }
    }

    /// True for edges the synchronizer is allowed to remove: auto provenance with an auto id.
    pub fn is_synced(&self) -> bool {
        self.provenance == Provenance::Auto && self.id.has_auto_prefix()
    }

    pub fn is_manual(&self) -> bool {
        self.provenance == Provenance::Manual
    }

    /// Whether this edge repeats `connection` exactly (same endpoints and handles).
    pub fn matches(&self, connection: &Connection) -> bool {
        self.source == connection.source
            && self.target == connection.target
            && self.source_handle == connection.source_handle
            && self.target_handle == connection.target_handle
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}--[{}]-->{} ({})",
            self.source, self.provenance, self.target, self.id
        )
    }
}
