// Equivalence check between a graph and its rewrite
// Every unique resolution must survive with the same effective declaration;
// ambiguities the plan neither marked nor settled must stay ambiguous, and
// marked ones must not end up with a single candidate

use super::rewrite_plan::RewritePlan;
use crate::error::{EngineError, EngineResult};
use crate::resolve::{effective_origin, resolve, visible_members, Resolution};
use flat_graph::{MemberPath, TypeGraph};

/// Check that `after` resolves every member of every type in `before` the
/// same way. Types added by the rewrite are not checked.
pub fn verify_equivalence(
    before: &TypeGraph,
    after: &TypeGraph,
    plan: &RewritePlan,
) -> EngineResult<()> {
    for id in before.ids() {
        let type_name = before.name(id);
        match after.get(id) {
            Some(decl) if decl.name() == type_name => {}
            _ => {
                return Err(EngineError::unsound(
                    type_name,
                    "*",
                    "type is missing from the rewritten graph".to_string(),
                ))
            }
        }

        for member in visible_members(before, id) {
            let name = member.name.as_str();
            let now = resolve(after, id, name);

            match member.resolution {
                Resolution::Unique(path) => {
                    let expected = effective_origin(before, &path.declaration);
                    match now {
                        Resolution::Unique(new_path) => {
                            let actual = effective_origin(after, &new_path.declaration);
                            if actual != expected {
                                return Err(EngineError::unsound(
                                    type_name,
                                    name,
                                    format!(
                                        "resolves to `{}` instead of `{}`",
                                        after.display_member(&actual),
                                        before.display_member(&expected)
                                    ),
                                ));
                            }
                        }
                        Resolution::Ambiguous(paths) => {
                            return Err(EngineError::unsound(
                                type_name,
                                name,
                                format!("became ambiguous across {} paths", paths.len()),
                            ))
                        }
                        Resolution::NotFound => {
                            return Err(EngineError::unsound(
                                type_name,
                                name,
                                "no longer resolves".to_string(),
                            ))
                        }
                    }
                }
                Resolution::Ambiguous(_) => {
                    if let Some(audit) = plan.auto_resolution(type_name, name) {
                        let settled = now.origin(after).map(|origin| {
                            MemberPath::new(after.name(origin.owner), origin.name)
                        });
                        if settled.as_ref() != Some(&audit.origin) {
                            return Err(EngineError::unsound(
                                type_name,
                                name,
                                format!("was not settled on `{}`", audit.origin),
                            ));
                        }
                    } else if plan.is_marked(type_name, name) {
                        if now.is_unique() {
                            return Err(EngineError::unsound(
                                type_name,
                                name,
                                "is marked for manual resolution but was settled".to_string(),
                            ));
                        }
                    } else if !now.is_ambiguous() {
                        return Err(EngineError::unsound(
                            type_name,
                            name,
                            "ambiguity was resolved without a marker".to_string(),
                        ));
                    }
                }
                Resolution::NotFound => {}
            }
        }
    }

    Ok(())
}
