// Depth analyzer - walks the type graph and reports structural violations
// Each concern is a rule; the analyzer runs every registered rule over a shared context

use crate::config::EngineConfig;
use crate::depth::DepthTable;
use crate::resolve::ResolvedPath;
use flat_graph::{TypeGraph, TypeId};
use serde::Serialize;

pub mod ambiguity;
pub mod depth_rule;

pub use ambiguity::AmbiguityRule;
pub use depth_rule::DepthRule;

/// A type whose longest embedding chain is longer than the limit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepthViolation {
    pub ty: TypeId,
    pub depth: usize,
    pub limit: usize,
    /// `[ty, T1, ..., Tk]`, earliest-declared embedding on ties
    pub chain: Vec<TypeId>,
}

/// A promoted-name collision: several paths of equal shortest length
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmbiguousResolution {
    pub ty: TypeId,
    pub member: String,
    pub paths: Vec<ResolvedPath>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    Depth(DepthViolation),
    Ambiguous(AmbiguousResolution),
}

impl Violation {
    pub fn ty(&self) -> TypeId {
        match self {
            Violation::Depth(v) => v.ty,
            Violation::Ambiguous(v) => v.ty,
        }
    }

    pub fn as_depth(&self) -> Option<&DepthViolation> {
        match self {
            Violation::Depth(v) => Some(v),
            Violation::Ambiguous(_) => None,
        }
    }

    pub fn as_ambiguous(&self) -> Option<&AmbiguousResolution> {
        match self {
            Violation::Ambiguous(v) => Some(v),
            Violation::Depth(_) => None,
        }
    }
}

/// Read-only inputs shared by all rules during one analysis
pub struct AnalysisContext<'g> {
    pub graph: &'g TypeGraph,
    pub depths: DepthTable,
}

impl<'g> AnalysisContext<'g> {
    pub fn new(graph: &'g TypeGraph) -> Self {
        Self {
            graph,
            depths: DepthTable::compute(graph),
        }
    }
}

/// Trait for implementing analysis rules
pub trait AnalysisRule: Send + Sync {
    /// Check the graph and return violations
    fn check(&self, ctx: &AnalysisContext<'_>) -> Vec<Violation>;

    /// Name of the rule
    fn name(&self) -> &str;
}

/// Runs all analysis rules
pub struct Analyzer {
    rules: Vec<Box<dyn AnalysisRule>>,
}

impl Analyzer {
    /// Create an analyzer with the rules the configuration asks for
    pub fn new(config: &EngineConfig) -> Self {
        let mut analyzer = Self::empty();
        analyzer.add_rule(Box::new(DepthRule::new(config.max_depth)));
        if config.report_ambiguities {
            analyzer.add_rule(Box::new(AmbiguityRule::new()));
        }
        analyzer
    }

    /// Create an analyzer with no rules (for custom configuration)
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(&mut self, rule: Box<dyn AnalysisRule>) {
        self.rules.push(rule);
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run every rule; violations come out grouped by rule, in rule order
    pub fn analyze(&self, graph: &TypeGraph) -> Vec<Violation> {
        let ctx = AnalysisContext::new(graph);
        let mut violations = Vec::new();

        for rule in &self.rules {
            let found = rule.check(&ctx);
            log::debug!("rule `{}` reported {} violation(s)", rule.name(), found.len());
            violations.extend(found);
        }

        log::info!(
            "analyzed {} types: {} violation(s)",
            graph.len(),
            violations.len()
        );
        violations
    }
}

/// Analyze `graph` with the default rule set and the given depth limit
pub fn analyze(graph: &TypeGraph, max_depth: usize) -> Vec<Violation> {
    Analyzer::new(&EngineConfig::with_max_depth(max_depth)).analyze(graph)
}
