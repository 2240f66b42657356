// Conversion of analysis results, plans and errors into diagnostics

use crate::analyzer::Violation;
use crate::error::EngineError;
use crate::rewriter::RewritePlan;
use flat_diagnostics::fuzzy::find_similar_types;
use flat_diagnostics::{error_codes, Diagnostic, Subject};
use flat_graph::{Edit, GraphError, TypeGraph};

pub fn violation_diagnostic(graph: &TypeGraph, violation: &Violation) -> Diagnostic {
    match violation {
        Violation::Depth(v) => {
            let chain: Vec<String> = v.chain.iter().map(|&id| graph.name(id).to_string()).collect();
            Diagnostic::warning(
                error_codes::DEPTH_EXCEEDED,
                format!(
                    "embedding depth of `{}` is {}, limit is {}",
                    graph.name(v.ty),
                    v.depth,
                    v.limit
                ),
                Subject::new(graph.name(v.ty)).with_chain(chain.clone()),
            )
            .with_note(format!("longest chain: {}", chain.join(" -> ")))
            .with_help("run `flat plan` to flatten the chain behind a forwarding type".to_string())
        }
        Violation::Ambiguous(v) => {
            let mut diagnostic = Diagnostic::warning(
                error_codes::AMBIGUOUS_RESOLUTION,
                format!(
                    "`{}` on `{}` is reachable through {} paths of equal depth",
                    v.member,
                    graph.name(v.ty),
                    v.paths.len()
                ),
                Subject::member(graph.name(v.ty), v.member.clone()),
            );
            for path in &v.paths {
                diagnostic = diagnostic.with_note(format!(
                    "via {} ({})",
                    path.names(graph).join(" -> "),
                    graph.display_member(&path.declaration)
                ));
            }
            diagnostic.with_help(format!(
                "declare `{}` on `{}` to pick one",
                v.member,
                graph.name(v.ty)
            ))
        }
    }
}

/// Diagnostics for every violation, in order
pub fn violation_diagnostics(graph: &TypeGraph, violations: &[Violation]) -> Vec<Diagnostic> {
    violations
        .iter()
        .map(|v| violation_diagnostic(graph, v))
        .collect()
}

/// Structural edits, manual-resolution markers, unflattened types and
/// auto-resolutions in a plan
pub fn plan_diagnostics(plan: &RewritePlan) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for edit in &plan.edits {
        match edit {
            Edit::SynthesizeType { name } => diagnostics.push(Diagnostic::info(
                error_codes::TYPE_SYNTHESIZED,
                format!("synthesized forwarding type `{}`", name),
                Subject::new(name.clone()),
            )),
            Edit::ReplaceEmbedding { owner, old, new } => diagnostics.push(Diagnostic::info(
                error_codes::EMBEDDING_REPLACED,
                format!("`{}` now embeds `{}` instead of `{}`", owner, new, old),
                Subject::new(owner.clone()),
            )),
            Edit::RemoveEmbedding { owner, target } => diagnostics.push(Diagnostic::info(
                error_codes::EMBEDDING_REMOVED,
                format!("`{}` no longer embeds `{}`", owner, target),
                Subject::new(owner.clone()),
            )),
            Edit::AddForwardingField { .. } | Edit::AddForwardingMethod { .. } => {}
        }
    }

    for marker in &plan.manual {
        let message = if plan.is_unflattened(&marker.type_name) {
            format!(
                "`{}.{}` is ambiguous; `{}` was left unflattened",
                marker.type_name, marker.member, marker.type_name
            )
        } else {
            format!(
                "`{}.{}` is ambiguous; no forwarder was generated for it",
                marker.type_name, marker.member
            )
        };
        let mut diagnostic = Diagnostic::warning(
            error_codes::MANUAL_RESOLUTION_REQUIRED,
            message,
            Subject::member(marker.type_name.clone(), marker.member.clone()),
        );
        for path in &marker.paths {
            diagnostic = diagnostic.with_note(format!("candidate: {}", path.join(" -> ")));
        }
        diagnostics.push(diagnostic.with_help(
            "declare the member on the type, or rerun with --auto-resolve".to_string(),
        ));
    }

    for type_name in &plan.unflattened {
        diagnostics.push(
            Diagnostic::warning(
                error_codes::LEFT_UNFLATTENED,
                format!(
                    "`{}` stays over the depth limit until its ambiguous members are resolved",
                    type_name
                ),
                Subject::new(type_name.clone()),
            )
            .with_note("flattening would leave a single candidate for a marked member".to_string()),
        );
    }

    for audit in &plan.auto_resolved {
        let mut diagnostic = Diagnostic::info(
            error_codes::AMBIGUITY_AUTO_RESOLVED,
            format!(
                "`{}.{}` now forwards to `{}`",
                audit.type_name, audit.member, audit.origin
            ),
            Subject::member(audit.type_name.clone(), audit.member.clone())
                .with_chain(audit.chosen.clone()),
        );
        for path in &audit.discarded {
            diagnostic = diagnostic.with_note(format!("discarded: {}", path.join(" -> ")));
        }
        diagnostics.push(diagnostic);
    }

    diagnostics
}

/// Error diagnostic for a graph failure. `known_types` feeds the
/// "did you mean" suggestion for unknown type names.
pub fn graph_error_diagnostic<S: AsRef<str>>(
    error: &GraphError,
    known_types: &[S],
) -> Diagnostic {
    let code = match error {
        GraphError::CyclicEmbedding { .. } => error_codes::CYCLIC_EMBEDDING,
        GraphError::UnknownType { .. } | GraphError::UnknownMember { .. } => {
            error_codes::UNKNOWN_TYPE
        }
        GraphError::DuplicateType { .. } => error_codes::DUPLICATE_TYPE,
        GraphError::DuplicateMember { .. } => error_codes::DUPLICATE_MEMBER,
        GraphError::MissingEmbedding { .. } => error_codes::MISSING_EMBEDDING,
    };

    let subject = match error {
        GraphError::CyclicEmbedding { cycle } => Subject::graph().with_chain(cycle.clone()),
        GraphError::UnknownMember { type_name, member } => {
            Subject::member(type_name.clone(), member.clone())
        }
        GraphError::DuplicateMember { owner, member } => {
            Subject::member(owner.clone(), member.clone())
        }
        other => Subject::new(other.type_name()),
    };

    let diagnostic = Diagnostic::error(code, error.to_string(), subject);
    match error {
        GraphError::UnknownType { name } => {
            match find_similar_types(name, known_types).into_iter().next() {
                Some(best) => diagnostic.with_suggestion(format!("did you mean `{}`?", best), best),
                None => diagnostic,
            }
        }
        GraphError::CyclicEmbedding { .. } => diagnostic
            .with_help("embedding must be acyclic; break the cycle before analysis".to_string()),
        _ => diagnostic,
    }
}

pub fn engine_error_diagnostic<S: AsRef<str>>(
    error: &EngineError,
    known_types: &[S],
) -> Diagnostic {
    match error {
        EngineError::Graph(inner) => graph_error_diagnostic(inner, known_types),
        EngineError::PlanUnsound {
            type_name, member, ..
        } => Diagnostic::error(
            error_codes::PLAN_UNSOUND,
            error.to_string(),
            Subject::member(type_name.clone(), member.clone()),
        )
        .with_note("no edits were applied".to_string()),
    }
}
