// Flattening rewriter - turns depth violations into a sound edit plan
//
// Each round takes the deepest remaining offender, detaches its first chain
// step behind a synthesized type that forwards everything the owner reached
// through it, and replays the edits on a working copy. The finished plan is
// checked against the original graph before it is returned.

use crate::analyzer::Violation;
use crate::config::EngineConfig;
use crate::depth::DepthTable;
use crate::error::EngineResult;
use crate::resolve::{effective_origin, resolve, visible_members, Resolution};
use flat_graph::{Edit, GraphError, MemberKind, MemberPath, MemberRef, TypeGraph, TypeId};
use std::cmp::Reverse;

mod equivalence;
mod rewrite_plan;

pub use equivalence::verify_equivalence;
pub use rewrite_plan::{AutoResolution, ManualResolutionRequired, RewritePlan};

pub struct Rewriter {
    config: EngineConfig,
}

impl Rewriter {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build a plan that brings every type named by a depth violation within
    /// `max_depth`. Ambiguity violations are informational here; ambiguous
    /// members met while flattening are marked or auto-resolved. A type whose
    /// flattening would leave a marked member with a single candidate is kept
    /// as is and listed in `unflattened`.
    pub fn plan(&self, graph: &TypeGraph, violations: &[Violation]) -> EngineResult<RewritePlan> {
        let mut pending: Vec<TypeId> = Vec::new();
        for violation in violations.iter().filter_map(Violation::as_depth) {
            if graph.get(violation.ty).is_none() {
                return Err(GraphError::UnknownType {
                    name: violation.ty.to_string(),
                }
                .into());
            }
            if !pending.contains(&violation.ty) {
                pending.push(violation.ty);
            }
        }

        let mut working = graph.clone();
        let mut plan = RewritePlan::default();

        loop {
            let depths = DepthTable::compute(&working);
            let next = pending
                .iter()
                .copied()
                .filter(|&id| depths.depth(id) > self.config.max_depth)
                .min_by_key(|&id| (Reverse(depths.depth(id)), id));
            let Some(owner) = next else { break };
            let Some(&embedded) = depths.chain(owner).get(1) else {
                break;
            };

            log::debug!(
                "flattening {} through {} (depth {})",
                working.name(owner),
                working.name(embedded),
                depths.depth(owner)
            );
            let step = self.flatten_step(&working, owner, embedded)?;
            let next_graph = working.apply_edits(&step.edits)?;

            // Detaching must not settle a marked ambiguity on the remaining path
            let settled_marker = step
                .manual
                .iter()
                .find(|m| resolve(&next_graph, owner, &m.member).is_unique())
                .map(|m| m.member.clone());
            if let Some(member) = settled_marker {
                log::warn!(
                    "leaving {} unflattened: detaching {} would make `{}` unambiguous",
                    working.name(owner),
                    working.name(embedded),
                    member
                );
                pending.retain(|&id| id != owner);
                plan.absorb(RewritePlan {
                    manual: step.manual,
                    unflattened: vec![working.name(owner).to_string()],
                    ..RewritePlan::default()
                });
                continue;
            }

            working = next_graph;
            plan.absorb(step);
        }

        verify_equivalence(graph, &working, &plan)?;
        log::info!(
            "plan ready: {} edits, {} manual, {} auto-resolved, {} unflattened",
            plan.edits.len(),
            plan.manual.len(),
            plan.auto_resolved.len(),
            plan.unflattened.len()
        );
        Ok(plan)
    }

    fn flatten_step(
        &self,
        graph: &TypeGraph,
        owner: TypeId,
        embedded: TypeId,
    ) -> EngineResult<RewritePlan> {
        let owner_name = graph.name(owner).to_string();
        let embedded_name = graph.name(embedded).to_string();
        let mut step = RewritePlan::default();
        let mut forwarded: Vec<(String, MemberRef)> = Vec::new();
        let mut settled: Vec<(String, MemberRef)> = Vec::new();

        for member in visible_members(graph, owner) {
            match member.resolution {
                Resolution::Unique(path) if path.via() == Some(embedded) => {
                    forwarded.push((member.name, path.declaration));
                }
                Resolution::Ambiguous(paths)
                    if paths.iter().any(|p| p.via() == Some(embedded)) =>
                {
                    let mut names: Vec<Vec<String>> =
                        paths.iter().map(|p| p.names(graph)).collect();

                    match paths.first() {
                        Some(chosen) if self.config.auto_resolve_ambiguity => {
                            let origin = effective_origin(graph, &chosen.declaration);
                            let discarded = names.split_off(1);
                            let chosen_names = names.remove(0);
                            log::warn!(
                                "{}.{} is ambiguous; using {}",
                                owner_name,
                                member.name,
                                chosen_names.join(" -> ")
                            );
                            step.auto_resolved.push(AutoResolution {
                                type_name: owner_name.clone(),
                                member: member.name.clone(),
                                chosen: chosen_names,
                                origin: MemberPath::new(graph.name(origin.owner), origin.name),
                                discarded,
                            });
                            settled.push((member.name, chosen.declaration.clone()));
                        }
                        _ => {
                            log::warn!(
                                "{}.{} is ambiguous across {} paths; manual resolution required",
                                owner_name,
                                member.name,
                                names.len()
                            );
                            step.manual.push(ManualResolutionRequired {
                                type_name: owner_name.clone(),
                                member: member.name,
                                paths: names,
                            });
                        }
                    }
                }
                _ => {}
            }
        }

        if forwarded.is_empty() || self.config.max_depth == 0 {
            for (name, declaration) in &forwarded {
                step.edits
                    .push(forwarding_edit(graph, &owner_name, name, declaration)?);
            }
            step.edits.push(Edit::RemoveEmbedding {
                owner: owner_name.clone(),
                target: embedded_name,
            });
        } else {
            let flat_name = flat_type_name(graph, &owner_name, &embedded_name);
            step.edits.push(Edit::SynthesizeType {
                name: flat_name.clone(),
            });
            for (name, declaration) in &forwarded {
                step.edits
                    .push(forwarding_edit(graph, &flat_name, name, declaration)?);
            }
            step.edits.push(Edit::ReplaceEmbedding {
                owner: owner_name.clone(),
                old: embedded_name,
                new: flat_name,
            });
        }

        for (name, declaration) in &settled {
            step.edits
                .push(forwarding_edit(graph, &owner_name, name, declaration)?);
        }

        Ok(step)
    }
}

/// Build a plan with a one-off rewriter
pub fn plan(
    graph: &TypeGraph,
    violations: &[Violation],
    config: &EngineConfig,
) -> EngineResult<RewritePlan> {
    Rewriter::new(config.clone()).plan(graph, violations)
}

/// `{Owner}{Embedded}Flat`, numbered from 2 when the name is taken
fn flat_type_name(graph: &TypeGraph, owner: &str, embedded: &str) -> String {
    let base = format!("{}{}Flat", owner, embedded);
    if !graph.contains(&base) {
        return base;
    }
    (2usize..)
        .map(|n| format!("{}{}", base, n))
        .find(|candidate| !graph.contains(candidate))
        .unwrap_or(base)
}

/// Forwarding member on `owner` standing in for `declaration`. The origin is
/// the effective declaration so forwarders never chain.
fn forwarding_edit(
    graph: &TypeGraph,
    owner: &str,
    name: &str,
    declaration: &MemberRef,
) -> EngineResult<Edit> {
    let origin = effective_origin(graph, declaration);
    let origin_path = MemberPath::new(graph.name(origin.owner), origin.name.clone());
    let decl = graph.decl(declaration.owner);

    let edit = match declaration.kind {
        MemberKind::Field => decl.field(&declaration.name).map(|f| Edit::AddForwardingField {
            owner: owner.to_string(),
            name: name.to_string(),
            ty: f.ty.clone(),
            origin: origin_path,
        }),
        MemberKind::Method => decl
            .method(&declaration.name)
            .map(|m| Edit::AddForwardingMethod {
                owner: owner.to_string(),
                name: name.to_string(),
                signature: m.signature.clone(),
                origin: origin_path,
            }),
    };

    edit.ok_or_else(|| {
        GraphError::UnknownMember {
            type_name: graph.name(declaration.owner).to_string(),
            member: declaration.name.clone(),
        }
        .into()
    })
}
