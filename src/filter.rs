use ahash::AHashSet;

/// Static deny-lists deciding which staged nodes and edges are exported at
/// all. Evaluated before sanitization; denied items are dropped silently.
///
/// [`FilterRules::default`] carries the deployment's standard lists;
/// [`FilterRules::empty`] starts from a clean slate for test runs.
#[derive(Debug, Clone)]
pub struct FilterRules {
    denied_node_labels: AHashSet<String>,
    denied_edge_types: AHashSet<String>,
    only_edge_type: Option<String>,
}

const DEFAULT_DENIED_NODE_LABELS: &[&str] = &[
    "CatchClause",
    "FunctionScope",
    "LLVMIRLanguage",
    "LocalScope",
    "TranslationUnitDeclaration",
    "OverlayEdge",
    "UnknownLanguage",
    "UnknownType",
];

const DEFAULT_DENIED_EDGE_TYPES: &[&str] = &[
    "ASSIGNED_TYPES",
    "CANDIDATES",
    "LANGUAGE",
    "EOG",
    "SCOPE",
    "TYPE",
    "TYPE_OBSERVERS",
];

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            denied_node_labels: DEFAULT_DENIED_NODE_LABELS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            denied_edge_types: DEFAULT_DENIED_EDGE_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            only_edge_type: None,
        }
    }
}

impl FilterRules {
    pub fn empty() -> Self {
        Self {
            denied_node_labels: AHashSet::new(),
            denied_edge_types: AHashSet::new(),
            only_edge_type: None,
        }
    }

    pub fn deny_label<T: Into<String>>(mut self, label: T) -> Self {
        self.denied_node_labels.insert(label.into());
        self
    }

    pub fn deny_edge_type<T: Into<String>>(mut self, edge_type: T) -> Self {
        self.denied_edge_types.insert(edge_type.into());
        self
    }

    /// Restricts the export to a single relationship type, on top of the
    /// deny-list.
    pub fn only_edge_type<T: Into<String>>(mut self, edge_type: T) -> Self {
        self.only_edge_type = Some(edge_type.into());
        self
    }

    /// A node survives unless its label set intersects the deny-list.
    pub fn allows_node(&self, labels: &[String]) -> bool {
        !labels.iter().any(|l| self.denied_node_labels.contains(l))
    }

    pub fn allows_edge(&self, edge_type: &str) -> bool {
        if self.denied_edge_types.contains(edge_type) {
            return false;
        }
        match &self.only_edge_type {
            Some(only) => only == edge_type,
            None => true,
        }
    }
}
