// flat-engine - composition-depth analysis and flattening for type-embedding graphs
//
// resolve   promotion semantics: which declaration a name denotes on a type
// analyzer  depth and ambiguity rules over a graph
// rewriter  sound edit plans that bring deep types within the limit
// metrics   DIT/NOC style design metrics

pub mod analyzer;
pub mod batch;
pub mod config;
pub mod depth;
pub mod error;
pub mod metrics;
pub mod report;
pub mod resolve;
pub mod rewriter;

pub use analyzer::{
    analyze, AmbiguousResolution, AnalysisContext, AnalysisRule, Analyzer, DepthViolation,
    Violation,
};
pub use batch::{analyze_batch, merge_graphs, plan_batch};
pub use config::{EngineConfig, CONFIG_FILE_NAME};
pub use depth::DepthTable;
pub use error::{EngineError, EngineResult};
pub use metrics::{collect_metrics, GraphMetrics, MetricsReport, TypeMetrics};
pub use resolve::{
    effective_origin, resolve, visible_members, MemberResolution, Resolution, ResolvedPath,
};
pub use rewriter::{
    plan, verify_equivalence, AutoResolution, ManualResolutionRequired, RewritePlan, Rewriter,
};

use flat_graph::TypeGraph;

/// Apply `plan` to `graph` and check the result resolves like the input.
/// Use this for plans that were stored or edited outside the rewriter.
pub fn apply_plan(graph: &TypeGraph, plan: &RewritePlan) -> EngineResult<TypeGraph> {
    let rewritten = plan.apply(graph)?;
    verify_equivalence(graph, &rewritten, plan)?;
    log::info!(
        "applied {} edits ({} types before, {} after)",
        plan.edits.len(),
        graph.len(),
        rewritten.len()
    );
    Ok(rewritten)
}
