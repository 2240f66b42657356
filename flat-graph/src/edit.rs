// Structural edits over a type graph
// Edits are plain data; applying them always produces a new graph

use crate::document::MemberPath;
use crate::error::{GraphError, GraphResult};
use crate::graph::TypeGraph;
use crate::model::{Field, MemberKind, Method};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One structural change. Types and members are referenced by name so a plan
/// stays readable and can be stored or diffed before it is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "edit", rename_all = "snake_case")]
pub enum Edit {
    /// Append a new, empty type with no embeddings
    SynthesizeType { name: String },

    /// Swap the embedding of `old` for `new`, keeping its declaration position
    ReplaceEmbedding {
        owner: String,
        old: String,
        new: String,
    },

    RemoveEmbedding { owner: String, target: String },

    /// Declare a field on `owner` that stands in for `origin`
    AddForwardingField {
        owner: String,
        name: String,
        #[serde(rename = "type")]
        ty: String,
        origin: MemberPath,
    },

    /// Declare a method on `owner` that stands in for `origin`
    AddForwardingMethod {
        owner: String,
        name: String,
        signature: String,
        origin: MemberPath,
    },
}

impl Edit {
    /// Type the edit changes
    pub fn owner(&self) -> &str {
        match self {
            Edit::SynthesizeType { name } => name,
            Edit::ReplaceEmbedding { owner, .. }
            | Edit::RemoveEmbedding { owner, .. }
            | Edit::AddForwardingField { owner, .. }
            | Edit::AddForwardingMethod { owner, .. } => owner,
        }
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edit::SynthesizeType { name } => write!(f, "synthesize type {}", name),
            Edit::ReplaceEmbedding { owner, old, new } => {
                write!(f, "{}: replace embedded {} with {}", owner, old, new)
            }
            Edit::RemoveEmbedding { owner, target } => {
                write!(f, "{}: remove embedded {}", owner, target)
            }
            Edit::AddForwardingField {
                owner,
                name,
                ty,
                origin,
            } => write!(f, "{}: add field {} {} forwarding to {}", owner, name, ty, origin),
            Edit::AddForwardingMethod {
                owner,
                name,
                signature,
                origin,
            } => write!(
                f,
                "{}: add method {} {} forwarding to {}",
                owner, name, signature, origin
            ),
        }
    }
}

/// Apply `edits` in order to a copy of `graph`.
///
/// Fails with `UnknownType` when an edit names a type that does not exist at
/// the point it is applied. The input graph is never touched.
pub fn apply_edits(graph: &TypeGraph, edits: &[Edit]) -> GraphResult<TypeGraph> {
    graph.apply_edits(edits)
}

impl TypeGraph {
    pub fn apply_edits(&self, edits: &[Edit]) -> GraphResult<TypeGraph> {
        let mut next = self.clone();
        for edit in edits {
            log::debug!("apply edit: {}", edit);
            next.apply_edit(edit)?;
        }
        next.check_acyclic()?;
        Ok(next)
    }

    fn apply_edit(&mut self, edit: &Edit) -> GraphResult<()> {
        match edit {
            Edit::SynthesizeType { name } => {
                let id = self.push_type(name.clone())?;
                self.decl_mut(id).synthesized = true;
            }
            Edit::ReplaceEmbedding { owner, old, new } => {
                let owner_id = self.require(owner)?;
                let old_id = self.require(old)?;
                let new_id = self.require(new)?;
                if self.decl(owner_id).embeds(new_id) {
                    return Err(GraphError::DuplicateMember {
                        owner: owner.clone(),
                        member: new.clone(),
                    });
                }
                let decl = self.decl_mut(owner_id);
                let slot = decl
                    .embeddings
                    .iter_mut()
                    .find(|e| e.target == old_id)
                    .ok_or_else(|| GraphError::MissingEmbedding {
                        owner: owner.clone(),
                        target: old.clone(),
                    })?;
                slot.target = new_id;
            }
            Edit::RemoveEmbedding { owner, target } => {
                let owner_id = self.require(owner)?;
                let target_id = self.require(target)?;
                let decl = self.decl_mut(owner_id);
                let before = decl.embeddings.len();
                decl.embeddings.retain(|e| e.target != target_id);
                if decl.embeddings.len() == before {
                    return Err(GraphError::MissingEmbedding {
                        owner: owner.clone(),
                        target: target.clone(),
                    });
                }
                decl.renumber_embeddings();
            }
            Edit::AddForwardingField {
                owner,
                name,
                ty,
                origin,
            } => {
                let owner_id = self.require(owner)?;
                let origin = self.member_ref(origin, MemberKind::Field)?;
                self.add_field(
                    owner_id,
                    Field {
                        name: name.clone(),
                        ty: ty.clone(),
                        forwards: Some(origin),
                    },
                )?;
            }
            Edit::AddForwardingMethod {
                owner,
                name,
                signature,
                origin,
            } => {
                let owner_id = self.require(owner)?;
                let origin = self.member_ref(origin, MemberKind::Method)?;
                self.add_method(
                    owner_id,
                    Method {
                        name: name.clone(),
                        signature: signature.clone(),
                        forwards: Some(origin),
                    },
                )?;
            }
        }
        Ok(())
    }
}
