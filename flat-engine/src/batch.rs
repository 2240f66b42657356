// Batch processing of independent graphs
// Graphs share nothing, so each one is analyzed or planned on its own rayon task

use crate::analyzer::{Analyzer, Violation};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::rewriter::{RewritePlan, Rewriter};
use flat_graph::{GraphDocument, GraphResult, TypeGraph};
use rayon::prelude::*;

/// Analyze every graph in parallel; results line up with `graphs`
pub fn analyze_batch(graphs: &[TypeGraph], config: &EngineConfig) -> Vec<Vec<Violation>> {
    let analyzer = Analyzer::new(config);
    log::debug!("analyzing {} graphs", graphs.len());
    graphs
        .par_iter()
        .map(|graph| analyzer.analyze(graph))
        .collect()
}

/// Plan every graph in parallel. A failure in one graph does not affect the others.
pub fn plan_batch(graphs: &[TypeGraph], config: &EngineConfig) -> Vec<EngineResult<RewritePlan>> {
    let analyzer = Analyzer::new(config);
    let rewriter = Rewriter::new(config.clone());
    graphs
        .par_iter()
        .map(|graph| rewriter.plan(graph, &analyzer.analyze(graph)))
        .collect()
}

/// Merge documents that reference each other's types into one graph
pub fn merge_graphs(documents: impl IntoIterator<Item = GraphDocument>) -> GraphResult<TypeGraph> {
    TypeGraph::from_document(&GraphDocument::merge(documents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flat_graph::GraphError;

    fn chain(prefix: &str, length: usize) -> TypeGraph {
        let mut doc = GraphDocument::new();
        doc.add_type(format!("{}0", prefix)).field("x", "int");
        for i in 1..length {
            doc.add_type(format!("{}{}", prefix, i))
                .embeds(format!("{}{}", prefix, i - 1));
        }
        TypeGraph::from_document(&doc).unwrap()
    }

    #[test]
    fn test_batch_results_follow_input_order() {
        let graphs = vec![chain("A", 2), chain("B", 4), chain("C", 3)];
        let results = analyze_batch(&graphs, &EngineConfig::default());

        let counts: Vec<usize> = results.iter().map(Vec::len).collect();
        assert_eq!(counts, vec![0, 2, 1]);
    }

    #[test]
    fn test_plan_batch() {
        let graphs = vec![chain("A", 2), chain("B", 4)];
        let plans = plan_batch(&graphs, &EngineConfig::default());

        assert!(plans[0].as_ref().unwrap().is_empty());
        let plan = plans[1].as_ref().unwrap();
        let after = plan.apply(&graphs[1]).unwrap();
        assert!(analyze_batch(&[after], &EngineConfig::default())[0].is_empty());
    }

    #[test]
    fn test_merge_cross_references() {
        let mut base = GraphDocument::new();
        base.add_type("Vehiculo").field("marca", "string");
        let mut derived = GraphDocument::new();
        derived.add_type("Auto").embeds("Vehiculo");

        assert!(matches!(
            TypeGraph::from_document(&derived),
            Err(GraphError::UnknownType { .. })
        ));
        let merged = merge_graphs(vec![base, derived]).unwrap();
        assert_eq!(merged.len(), 2);
    }
}
