use crate::error::{GatewayError, Result};
use crate::filter::node::FilterNode;

/// Builds a `?criteria={...}` query suffix out of one or more top-level
/// filter sets.
///
/// An empty filter (no sets added) renders as `?criteria={}` rather than
/// failing at build time — the gateway accepts the empty object as "no
/// constraint", and rejecting it here would just push the same decision
/// onto every caller.
#[derive(Debug, Clone, Default)]
pub struct CriteriaFilter {
    sets: Vec<FilterNode>,
}

impl CriteriaFilter {
    pub fn new() -> Self {
        CriteriaFilter { sets: Vec::new() }
    }

    pub fn add(mut self, node: FilterNode) -> Self {
        self.sets.push(node);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Renders the `?criteria=...` query-string suffix.
    pub fn to_query_suffix(&self) -> String {
        let body = self.sets.iter().map(FilterNode::pair).collect::<Vec<_>>().join(",");
        format!("?criteria={{{}}}", body)
    }
}

/// Builds a `?<name>={...}` query suffix around a single named-query node.
#[derive(Debug, Clone)]
pub struct NamedQueryFilter {
    name: String,
    node: FilterNode,
}

impl NamedQueryFilter {
    pub fn new(name: impl Into<String>, node: FilterNode) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(GatewayError::invalid_argument("NamedQueryFilter", "name", "must not be empty"));
        }
        match &node {
            FilterNode::NamedQuery { .. }
            | FilterNode::NamedQueryObject { .. }
            | FilterNode::NamedQueryCombination { .. }
            | FilterNode::NamedQueryObjectArrayCombination { .. } => Ok(NamedQueryFilter { name, node }),
            _ => Err(GatewayError::invalid_argument(
                "NamedQueryFilter",
                "node",
                "must be a named-query variant",
            )),
        }
    }

    pub fn to_query_suffix(&self) -> String {
        format!("?{}={{{}}}", self.name, self.node.pair())
    }
}

/// Builds a flat `?k1=v1&k2=v2` query suffix — the non-JSON filter shape
/// used by plain attribute lookups.
#[derive(Debug, Clone, Default)]
pub struct FilterMap {
    pairs: Vec<(String, String)>,
}

impl FilterMap {
    pub fn new() -> Self {
        FilterMap { pairs: Vec::new() }
    }

    pub fn add(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(GatewayError::invalid_argument("FilterMap", "key", "must not be empty"));
        }
        self.pairs.push((key, value.into()));
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn to_query_suffix(&self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }
        let body = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        format!("?{}", body)
    }
}
