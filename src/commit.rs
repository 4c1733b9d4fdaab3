//! Two-phase batched persistence. Phase 1 commits nodes grouped by label
//! set, phase 2 commits edges grouped by relationship type and chunked to
//! bound per-operation payloads. All operations of a phase run concurrently
//! on a fixed-size worker pool; the engine joins the whole phase before
//! moving on, because phase 2 locates its endpoints by the `cpgId` property
//! written in phase 1.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use rayon::prelude::*;

use crate::context::ExportContext;
use crate::correlate::IdentityCorrelator;
use crate::errors::ExportError;
use crate::filter::FilterRules;
use crate::model::SanitizedValue;
use crate::sanitize::sanitize_bag;
use crate::store::{CPG_ID_KEY, EdgeOutcome, EdgeRow, GraphStore, NodeRow};

/// Property name carrying the correlator's external id on every persisted
/// node.
pub const EXTERNAL_ID_KEY: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitState {
    Staged,
    NodesCommitting,
    NodesDone,
    EdgesCommitting,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub struct CommitOptions {
    /// Delete all previously exported content before phase 1 (full-replace
    /// instead of incremental-merge).
    pub clear_before_commit: bool,
    /// Maximum number of edges per bulk operation.
    pub edge_chunk_size: usize,
    /// Size of the worker pool executing store operations.
    pub workers: usize,
    /// Fail the run on an unresolved edge endpoint instead of dropping the
    /// edge silently.
    pub strict_unresolved: bool,
    /// Export only nodes carrying an annotation in the context snapshot.
    pub annotated_nodes_only: bool,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self {
            clear_before_commit: false,
            edge_chunk_size: 1000,
            workers: 6,
            strict_unresolved: false,
            annotated_nodes_only: false,
        }
    }
}

/// Counters of one completed (or failed) run, for observability.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub nodes_committed: usize,
    pub node_groups: usize,
    pub nodes_filtered: usize,
    pub edges_created: usize,
    pub edges_attempted: usize,
    pub edges_unmatched: usize,
    pub edges_filtered: usize,
    pub edges_unresolved: usize,
    pub edge_chunks: usize,
}

pub struct CommitEngine<S: GraphStore> {
    store: Arc<S>,
    rules: FilterRules,
    options: CommitOptions,
    state: RwLock<CommitState>,
}

impl<S: GraphStore> CommitEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            rules: FilterRules::default(),
            options: CommitOptions::default(),
            state: RwLock::new(CommitState::Staged),
        }
    }

    pub fn with_rules(mut self, rules: FilterRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_options(mut self, options: CommitOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> CommitState {
        *self.state.read()
    }

    fn set_state(&self, state: CommitState) {
        *self.state.write() = state;
    }

    /// Executes one full export run: optional clear, then nodes, then edges.
    ///
    /// Failure policy is fail-together-per-phase: every operation dispatched
    /// in a phase runs to completion before the first error is returned, so
    /// no label group or chunk is torn down mid-flight by a sibling failure.
    pub fn run(
        &self,
        ctx: &ExportContext,
        correlator: &IdentityCorrelator,
    ) -> Result<CommitReport, ExportError> {
        if self.options.edge_chunk_size == 0 {
            return Err(ExportError::invalid_input("edge chunk size must be positive"));
        }
        if self.options.workers == 0 {
            return Err(ExportError::invalid_input("worker count must be positive"));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.workers)
            .build()
            .map_err(|e| ExportError::commit(e.to_string()))?;

        let result = self.run_phases(ctx, correlator, &pool);
        if result.is_err() {
            self.set_state(CommitState::Failed);
        }
        result
    }

    fn run_phases(
        &self,
        ctx: &ExportContext,
        correlator: &IdentityCorrelator,
        pool: &rayon::ThreadPool,
    ) -> Result<CommitReport, ExportError> {
        let mut report = CommitReport::default();

        if self.options.clear_before_commit {
            self.store.clear()?;
        }

        // Phase 1: group surviving nodes by their label-set signature.
        let mut groups: AHashMap<String, Vec<NodeRow>> = AHashMap::new();
        for node in ctx.nodes() {
            if !self.rules.allows_node(&node.labels) {
                report.nodes_filtered += 1;
                continue;
            }
            if self.options.annotated_nodes_only && !ctx.has_annotation(node) {
                report.nodes_filtered += 1;
                continue;
            }
            let mut props = sanitize_bag(&node.properties);
            props.insert(CPG_ID_KEY.to_string(), SanitizedValue::Int(node.local_id));
            props.insert(
                EXTERNAL_ID_KEY.to_string(),
                SanitizedValue::String(correlator.id_for(node).to_string()),
            );
            ctx.merge_annotation(node, &mut props);
            // Upstream label order is kept, supplementary labels follow; the
            // joined set is the grouping key, not part of the persisted
            // graph semantics.
            groups
                .entry(ctx.effective_labels(node).join(":"))
                .or_default()
                .push(props);
        }
        report.node_groups = groups.len();
        let staged_nodes: usize = groups.values().map(Vec::len).sum();
        log::info!(
            "committing {} nodes in {} label groups ({} filtered)",
            staged_nodes,
            report.node_groups,
            report.nodes_filtered
        );

        self.set_state(CommitState::NodesCommitting);
        let groups: Vec<(String, Vec<NodeRow>)> = groups.into_iter().collect();
        let results: Vec<Result<usize, ExportError>> = pool.install(|| {
            groups
                .par_iter()
                .map(|(label_set, rows)| self.store.create_nodes(label_set, rows))
                .collect()
        });
        for result in results {
            report.nodes_committed += result?;
        }
        self.set_state(CommitState::NodesDone);

        // Phase 2: group surviving edges by type, drop unresolved endpoints.
        let mut by_type: AHashMap<String, Vec<EdgeRow>> = AHashMap::new();
        for edge in ctx.edges() {
            if !self.rules.allows_edge(&edge.edge_type) {
                report.edges_filtered += 1;
                continue;
            }
            let (Some(start_id), Some(end_id)) = (edge.start, edge.end) else {
                if self.options.strict_unresolved {
                    return Err(ExportError::unresolved(format!(
                        "{} edge with missing endpoint",
                        edge.edge_type
                    )));
                }
                report.edges_unresolved += 1;
                continue;
            };
            by_type.entry(edge.edge_type.clone()).or_default().push(EdgeRow {
                start_id,
                end_id,
                props: sanitize_bag(&edge.properties),
            });
        }

        let mut chunks: Vec<(&str, &[EdgeRow])> = Vec::new();
        for (edge_type, rows) in &by_type {
            for chunk in rows.chunks(self.options.edge_chunk_size) {
                chunks.push((edge_type.as_str(), chunk));
            }
        }
        report.edge_chunks = chunks.len();
        log::info!(
            "committing {} edges in {} chunks ({} filtered, {} unresolved)",
            by_type.values().map(Vec::len).sum::<usize>(),
            report.edge_chunks,
            report.edges_filtered,
            report.edges_unresolved
        );

        self.set_state(CommitState::EdgesCommitting);
        let results: Vec<Result<EdgeOutcome, ExportError>> = pool.install(|| {
            chunks
                .par_iter()
                .map(|(edge_type, rows)| self.store.create_edges(edge_type, rows))
                .collect()
        });
        let mut outcome = EdgeOutcome::default();
        for result in results {
            outcome.absorb(result?);
        }
        report.edges_attempted = outcome.attempted;
        report.edges_created = outcome.created;
        report.edges_unmatched = outcome.unmatched;
        self.set_state(CommitState::Done);

        log::info!(
            "run complete: {} nodes, {} edges created, {} unmatched",
            report.nodes_committed,
            report.edges_created,
            report.edges_unmatched
        );
        Ok(report)
    }
}
