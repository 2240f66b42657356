// Design metrics over the embedding graph
// DIT: depth of the longest embedding chain; NOC: number of direct embedders

use crate::config::EngineConfig;
use crate::depth::DepthTable;
use crate::resolve::{resolve, visible_members, Resolution};
use flat_graph::{TypeGraph, TypeId};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeMetrics {
    pub name: String,
    /// Depth of embedding
    pub dit: usize,
    /// Number of types embedding this one directly
    pub noc: usize,
    pub declared: usize,
    /// Visible names reached through an embedding
    pub promoted: usize,
    /// Declared names that hide a member of an embedded type
    pub shadowed: usize,
    pub ambiguous: usize,
    pub synthesized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphMetrics {
    pub type_count: usize,
    pub max_depth: usize,
    pub mean_depth: f64,
    pub threshold: usize,
    pub over_threshold: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub types: Vec<TypeMetrics>,
    pub summary: GraphMetrics,
}

impl MetricsReport {
    pub fn get(&self, name: &str) -> Option<&TypeMetrics> {
        self.types.iter().find(|t| t.name == name)
    }
}

/// Collect per-type and graph-wide metrics. `config.max_depth` is the
/// threshold for `over_threshold`.
pub fn collect_metrics(graph: &TypeGraph, config: &EngineConfig) -> MetricsReport {
    let depths = DepthTable::compute(graph);
    let types: Vec<TypeMetrics> = graph
        .ids()
        .map(|id| type_metrics(graph, &depths, id))
        .collect();

    let summary = GraphMetrics {
        type_count: graph.len(),
        max_depth: depths.max_depth(),
        mean_depth: depths.mean_depth(),
        threshold: config.max_depth,
        over_threshold: types.iter().filter(|t| t.dit > config.max_depth).count(),
    };
    log::debug!(
        "metrics: {} types, max depth {}, {} over {}",
        summary.type_count,
        summary.max_depth,
        summary.over_threshold,
        summary.threshold
    );

    MetricsReport { types, summary }
}

fn type_metrics(graph: &TypeGraph, depths: &DepthTable, id: TypeId) -> TypeMetrics {
    let decl = graph.decl(id);
    let mut promoted = 0;
    let mut ambiguous = 0;

    for member in visible_members(graph, id) {
        match member.resolution {
            Resolution::Unique(path) if path.depth() > 0 => promoted += 1,
            Resolution::Ambiguous(_) => {
                promoted += 1;
                ambiguous += 1;
            }
            _ => {}
        }
    }

    let shadowed = decl
        .member_names()
        .filter(|name| {
            graph
                .embedded(id)
                .any(|inner| !matches!(resolve(graph, inner, name), Resolution::NotFound))
        })
        .count();

    TypeMetrics {
        name: decl.name().to_string(),
        dit: depths.depth(id),
        noc: graph.embedders(id).len(),
        declared: decl.member_count(),
        promoted,
        shadowed,
        ambiguous,
        synthesized: decl.is_synthesized(),
    }
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .types
            .iter()
            .map(|t| t.name.len())
            .max()
            .unwrap_or(4)
            .max(4);

        writeln!(
            f,
            "{:<width$}  {:>4} {:>4} {:>8} {:>8} {:>8} {:>9}",
            "type", "dit", "noc", "declared", "promoted", "shadowed", "ambiguous"
        )?;
        for t in &self.types {
            writeln!(
                f,
                "{:<width$}  {:>4} {:>4} {:>8} {:>8} {:>8} {:>9}",
                t.name, t.dit, t.noc, t.declared, t.promoted, t.shadowed, t.ambiguous
            )?;
        }
        write!(
            f,
            "\n{} types, max depth {}, mean depth {:.2}, {} over {}",
            self.summary.type_count,
            self.summary.max_depth,
            self.summary.mean_depth,
            self.summary.over_threshold,
            self.summary.threshold
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flat_graph::GraphDocument;

    fn vehicles() -> TypeGraph {
        let mut doc = GraphDocument::new();
        doc.add_type("Vehiculo")
            .field("marca", "string")
            .method("Arrancar", "func()")
            .method("MostrarInfo", "func() string");
        doc.add_type("Auto").embeds("Vehiculo").field("puertas", "int");
        doc.add_type("Camion")
            .embeds("Auto")
            .field("cargaMaxima", "int")
            .method("MostrarInfo", "func() string");
        TypeGraph::from_document(&doc).unwrap()
    }

    #[test]
    fn test_per_type_metrics() {
        let report = collect_metrics(&vehicles(), &EngineConfig::default());

        let vehiculo = report.get("Vehiculo").unwrap();
        assert_eq!((vehiculo.dit, vehiculo.noc, vehiculo.declared), (0, 1, 3));

        let camion = report.get("Camion").unwrap();
        assert_eq!(camion.dit, 2);
        assert_eq!(camion.noc, 0);
        assert_eq!(camion.declared, 2);
        // puertas, marca, Arrancar
        assert_eq!(camion.promoted, 3);
        assert_eq!(camion.shadowed, 1);
        assert_eq!(camion.ambiguous, 0);
    }

    #[test]
    fn test_summary() {
        let report = collect_metrics(&vehicles(), &EngineConfig::default());
        assert_eq!(report.summary.type_count, 3);
        assert_eq!(report.summary.max_depth, 2);
        assert!((report.summary.mean_depth - 1.0).abs() < f64::EPSILON);
        assert_eq!(report.summary.over_threshold, 1);
    }

    #[test]
    fn test_ambiguous_members_are_counted() {
        let mut doc = GraphDocument::new();
        doc.add_type("Motor").field("potencia", "int");
        doc.add_type("Bateria").field("potencia", "int");
        doc.add_type("Hibrido").embeds("Motor").embeds("Bateria");
        let report = collect_metrics(
            &TypeGraph::from_document(&doc).unwrap(),
            &EngineConfig::default(),
        );

        let hibrido = report.get("Hibrido").unwrap();
        assert_eq!(hibrido.ambiguous, 1);
        assert_eq!(hibrido.promoted, 1);
    }

    #[test]
    fn test_table_rendering() {
        let text = collect_metrics(&vehicles(), &EngineConfig::default()).to_string();
        assert!(text.starts_with("type"));
        assert!(text.contains("Camion"));
        assert!(text.ends_with("3 types, max depth 2, mean depth 1.00, 1 over 1"));
    }
}
