//! Bulk export of an analysis-produced property graph into a persistent
//! graph store: staging, filtering, property sanitization, symbol
//! demangling, identity correlation, and a two-phase concurrent commit.

pub mod aux_store;
pub mod commit;
pub mod context;
pub mod correlate;
pub mod demangle;
pub mod errors;
pub mod filter;
pub mod label_store;
pub mod model;
pub mod sanitize;
pub mod store;

pub use crate::aux_store::AuxDataStore;
pub use crate::commit::{CommitEngine, CommitOptions, CommitReport, CommitState, EXTERNAL_ID_KEY};
pub use crate::context::ExportContext;
pub use crate::correlate::{ExternalId, IdentityCorrelator};
pub use crate::demangle::demangle;
pub use crate::errors::ExportError;
pub use crate::filter::FilterRules;
pub use crate::label_store::LabelStore;
pub use crate::model::{
    AnalysisNode, NodeHandle, PropertyBag, PropertyValue, SanitizedBag, SanitizedValue, StagedEdge,
};
pub use crate::sanitize::{sanitize_bag, sanitize_value};
pub use crate::store::{
    CPG_ID_KEY, EdgeOutcome, EdgeRow, GraphStore, NodeRow, SqliteExportStore, StoredEdge,
    StoredNode,
};
