use std::collections::BTreeMap;
use std::sync::Weak;

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::model::{AnalysisNode, NodeHandle};

struct AuxEntry {
    object: Weak<AnalysisNode>,
    values: BTreeMap<String, String>,
}

/// Side table associating supplemental (key, value) annotations with specific
/// staged nodes, populated by an earlier analysis pass and consulted only at
/// export time.
///
/// Entries are keyed by object identity and hold only a [`Weak`] handle, so
/// the store never keeps a node alive on its own. Consumers must snapshot
/// the annotations they need while the nodes are still strongly referenced;
/// see [`crate::context::ExportContext`].
#[derive(Default)]
pub struct AuxDataStore {
    inner: RwLock<AHashMap<usize, AuxEntry>>,
}

impl AuxDataStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(AHashMap::new()),
        }
    }

    /// Associates `value` with `key` on the given node, replacing any prior
    /// value recorded for that key.
    pub fn record<K, V>(&self, object: &NodeHandle, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let addr = NodeHandle::as_ptr(object) as usize;
        let mut map = self.inner.write();
        let entry = map.entry(addr).or_insert_with(|| AuxEntry {
            object: NodeHandle::downgrade(object),
            values: BTreeMap::new(),
        });
        // A reused allocation address must not inherit a dead entry's data.
        if entry.object.upgrade().is_none_or(|o| !NodeHandle::ptr_eq(&o, object)) {
            entry.object = NodeHandle::downgrade(object);
            entry.values.clear();
        }
        entry.values.insert(key.into(), value.into());
    }

    pub fn has(&self, object: &NodeHandle) -> bool {
        let addr = NodeHandle::as_ptr(object) as usize;
        let map = self.inner.read();
        map.get(&addr)
            .and_then(|e| e.object.upgrade())
            .is_some_and(|o| NodeHandle::ptr_eq(&o, object))
    }

    pub fn get(&self, object: &NodeHandle) -> Option<BTreeMap<String, String>> {
        let addr = NodeHandle::as_ptr(object) as usize;
        let map = self.inner.read();
        let entry = map.get(&addr)?;
        let live = entry.object.upgrade()?;
        if NodeHandle::ptr_eq(&live, object) {
            Some(entry.values.clone())
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
