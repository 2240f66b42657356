// Embedding depth rule
// Reports every type whose longest chain exceeds the limit, once, with that chain

use super::{AnalysisContext, AnalysisRule, DepthViolation, Violation};

pub struct DepthRule {
    max_depth: usize,
}

impl DepthRule {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl AnalysisRule for DepthRule {
    fn check(&self, ctx: &AnalysisContext<'_>) -> Vec<Violation> {
        ctx.graph
            .ids()
            .filter(|&id| ctx.depths.depth(id) > self.max_depth)
            .map(|id| {
                Violation::Depth(DepthViolation {
                    ty: id,
                    depth: ctx.depths.depth(id),
                    limit: self.max_depth,
                    chain: ctx.depths.chain(id),
                })
            })
            .collect()
    }

    fn name(&self) -> &str {
        "embedding-depth"
    }
}
