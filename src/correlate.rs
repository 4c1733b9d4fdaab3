use std::fmt;
use std::sync::Weak;

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::model::{AnalysisNode, NodeHandle};

/// A durably unique identifier minted once per distinct node identity.
///
/// Exists because the upstream builder's `local_id` is known to collide
/// across independently constructed subgraphs. Not persisted across process
/// restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalId(u128);

impl ExternalId {
    fn random() -> Self {
        Self(rand::random())
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

struct IdEntry {
    object: Weak<AnalysisNode>,
    id: ExternalId,
}

/// Maps node identities to process-stable [`ExternalId`]s.
///
/// Safe for concurrent callers: the first caller for an identity mints the
/// id, later callers observe the same one.
#[derive(Default)]
pub struct IdentityCorrelator {
    inner: RwLock<AHashMap<usize, IdEntry>>,
}

impl IdentityCorrelator {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(AHashMap::new()),
        }
    }

    pub fn id_for(&self, object: &NodeHandle) -> ExternalId {
        let addr = NodeHandle::as_ptr(object) as usize;
        {
            let map = self.inner.read();
            if let Some(entry) = map.get(&addr)
                && let Some(live) = entry.object.upgrade()
                && NodeHandle::ptr_eq(&live, object)
            {
                return entry.id;
            }
        }
        let mut map = self.inner.write();
        let entry = map.entry(addr).or_insert_with(|| IdEntry {
            object: NodeHandle::downgrade(object),
            id: ExternalId::random(),
        });
        // A reclaimed allocation address gets a fresh id.
        if entry.object.upgrade().is_none_or(|o| !NodeHandle::ptr_eq(&o, object)) {
            entry.object = NodeHandle::downgrade(object);
            entry.id = ExternalId::random();
        }
        entry.id
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
