use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::aux_store::AuxDataStore;
use crate::label_store::LabelStore;
use crate::model::{AnalysisNode, NodeHandle, SanitizedBag, SanitizedValue, StagedEdge};

/// Session-scoped aggregate of everything one export run persists.
///
/// Constructed once per run from the upstream builder's staged nodes and
/// edges. Annotations and supplementary labels are copied out of their
/// stores at construction time, for exactly the staged nodes: the stores
/// only hold weak handles and the commit engine may run after arbitrary
/// delay, so a long-lived lookup through them would race object
/// reclamation.
pub struct ExportContext {
    nodes: Vec<NodeHandle>,
    edges: Vec<StagedEdge>,
    aux_snapshot: AHashMap<i64, BTreeMap<String, String>>,
    label_snapshot: AHashMap<i64, Vec<String>>,
}

impl ExportContext {
    pub fn new(
        nodes: Vec<NodeHandle>,
        edges: Vec<StagedEdge>,
        aux: &AuxDataStore,
        labels: &LabelStore,
    ) -> Self {
        let mut aux_snapshot = AHashMap::new();
        let mut label_snapshot = AHashMap::new();
        for node in &nodes {
            if let Some(values) = aux.get(node) {
                aux_snapshot.insert(node.local_id, values);
            }
            if let Some(extra) = labels.get(node) {
                label_snapshot.insert(node.local_id, extra);
            }
        }
        Self {
            nodes,
            edges,
            aux_snapshot,
            label_snapshot,
        }
    }

    pub fn nodes(&self) -> &[NodeHandle] {
        &self.nodes
    }

    pub fn edges(&self) -> &[StagedEdge] {
        &self.edges
    }

    pub fn has_annotation(&self, node: &AnalysisNode) -> bool {
        self.aux_snapshot.contains_key(&node.local_id)
    }

    /// Writes the node's annotation keys into an already-sanitized bag.
    /// No-op when the node carries no annotation.
    pub fn merge_annotation(&self, node: &AnalysisNode, props: &mut SanitizedBag) {
        let Some(values) = self.aux_snapshot.get(&node.local_id) else {
            return;
        };
        for (key, value) in values {
            props.insert(key.clone(), SanitizedValue::String(value.clone()));
        }
    }

    /// The node's upstream labels extended with its snapshotted
    /// supplementary labels (sorted, deduplicated against the upstream
    /// set). This is the label set persisted and used as the batching key.
    pub fn effective_labels(&self, node: &AnalysisNode) -> Vec<String> {
        let mut labels = node.labels.clone();
        if let Some(extra) = self.label_snapshot.get(&node.local_id) {
            for label in extra {
                if !labels.contains(label) {
                    labels.push(label.clone());
                }
            }
        }
        labels
    }
}
