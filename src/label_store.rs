use std::collections::BTreeSet;
use std::sync::Weak;

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::model::{AnalysisNode, NodeHandle};

struct LabelEntry {
    object: Weak<AnalysisNode>,
    labels: BTreeSet<String>,
}

/// Side table of supplementary labels attached to specific staged nodes by
/// earlier analysis passes, merged into the node's label set at export time.
///
/// Weakly associated by object identity, like [`crate::aux_store::AuxDataStore`]:
/// the store never keeps a node alive, and consumers snapshot what they need
/// while the nodes are still strongly referenced.
#[derive(Default)]
pub struct LabelStore {
    inner: RwLock<AHashMap<usize, LabelEntry>>,
}

impl LabelStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(AHashMap::new()),
        }
    }

    pub fn add<L: Into<String>>(&self, object: &NodeHandle, label: L) {
        let addr = NodeHandle::as_ptr(object) as usize;
        let mut map = self.inner.write();
        let entry = map.entry(addr).or_insert_with(|| LabelEntry {
            object: NodeHandle::downgrade(object),
            labels: BTreeSet::new(),
        });
        // A reused allocation address must not inherit a dead entry's labels.
        if entry.object.upgrade().is_none_or(|o| !NodeHandle::ptr_eq(&o, object)) {
            entry.object = NodeHandle::downgrade(object);
            entry.labels.clear();
        }
        entry.labels.insert(label.into());
    }

    pub fn add_all<I, L>(&self, object: &NodeHandle, labels: I)
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        for label in labels {
            self.add(object, label);
        }
    }

    pub fn has(&self, object: &NodeHandle) -> bool {
        let addr = NodeHandle::as_ptr(object) as usize;
        let map = self.inner.read();
        map.get(&addr)
            .and_then(|e| e.object.upgrade())
            .is_some_and(|o| NodeHandle::ptr_eq(&o, object))
    }

    /// Returns the node's supplementary labels in sorted order.
    pub fn get(&self, object: &NodeHandle) -> Option<Vec<String>> {
        let addr = NodeHandle::as_ptr(object) as usize;
        let map = self.inner.read();
        let entry = map.get(&addr)?;
        let live = entry.object.upgrade()?;
        if NodeHandle::ptr_eq(&live, object) {
            Some(entry.labels.iter().cloned().collect())
        } else {
            None
        }
    }

    /// Drops entries whose node has been released everywhere else.
    pub fn prune(&self) {
        self.inner
            .write()
            .retain(|_, entry| entry.object.upgrade().is_some());
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
