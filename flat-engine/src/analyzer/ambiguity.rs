// Ambiguous promotion rule
// Surfaces every member name that two or more equally short paths supply

use super::{AmbiguousResolution, AnalysisContext, AnalysisRule, Violation};
use crate::resolve::{visible_members, Resolution};

#[derive(Default)]
pub struct AmbiguityRule;

impl AmbiguityRule {
    pub fn new() -> Self {
        Self
    }
}

impl AnalysisRule for AmbiguityRule {
    fn check(&self, ctx: &AnalysisContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for id in ctx.graph.ids() {
            for member in visible_members(ctx.graph, id) {
                if let Resolution::Ambiguous(paths) = member.resolution {
                    violations.push(Violation::Ambiguous(AmbiguousResolution {
                        ty: id,
                        member: member.name,
                        paths,
                    }));
                }
            }
        }

        violations
    }

    fn name(&self) -> &str {
        "ambiguous-promotion"
    }
}
