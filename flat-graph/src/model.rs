// Core records of the type-embedding graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a type inside one `TypeGraph`.
///
/// Ids are arena indices. Edits only ever append types, so an id minted by a
/// graph stays valid (and names the same type) in every graph derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(u32);

impl TypeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field,
    Method,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Field => write!(f, "field"),
            MemberKind::Method => write!(f, "method"),
        }
    }
}

/// A single declaration: the member `name` declared directly on `owner`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberRef {
    pub owner: TypeId,
    pub name: String,
    pub kind: MemberKind,
}

impl MemberRef {
    pub fn new(owner: TypeId, name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            owner,
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    /// Declared type, kept opaque
    pub ty: String,
    /// Set on forwarding fields: the declaration this field stands in for
    pub forwards: Option<MemberRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    /// Signature, kept opaque; bodies are never analyzed
    pub signature: String,
    pub forwards: Option<MemberRef>,
}

/// Edge "owner embeds `target`". `order` is the declaration index inside the
/// owner and decides promotion ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Embedding {
    pub target: TypeId,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub(crate) id: TypeId,
    pub(crate) name: String,
    pub(crate) fields: Vec<Field>,
    pub(crate) methods: Vec<Method>,
    pub(crate) embeddings: Vec<Embedding>,
    pub(crate) synthesized: bool,
}

impl TypeDecl {
    pub(crate) fn new(id: TypeId, name: String) -> Self {
        Self {
            id,
            name,
            fields: Vec::new(),
            methods: Vec::new(),
            embeddings: Vec::new(),
            synthesized: false,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn embeddings(&self) -> &[Embedding] {
        &self.embeddings
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Whether the type was created by a rewrite rather than by the front-end
    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }

    /// The declaration of `name` made directly on this type, if any.
    /// Fields take precedence over methods of the same name.
    pub fn declaration(&self, name: &str) -> Option<MemberRef> {
        if self.fields.iter().any(|f| f.name == name) {
            return Some(MemberRef::new(self.id, name, MemberKind::Field));
        }
        if self.methods.iter().any(|m| m.name == name) {
            return Some(MemberRef::new(self.id, name, MemberKind::Method));
        }
        None
    }

    pub fn declares(&self, name: &str) -> bool {
        self.declaration(name).is_some()
    }

    /// Forwarding target of the member `name`, when that member is a forwarder
    pub fn forward_target(&self, name: &str) -> Option<&MemberRef> {
        if let Some(field) = self.field(name) {
            return field.forwards.as_ref();
        }
        self.method(name).and_then(|m| m.forwards.as_ref())
    }

    /// Names of every member declared directly on this type, fields first
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .map(|f| f.name.as_str())
            .chain(self.methods.iter().map(|m| m.name.as_str()))
    }

    pub fn member_count(&self) -> usize {
        self.fields.len() + self.methods.len()
    }

    pub fn embeds(&self, target: TypeId) -> bool {
        self.embeddings.iter().any(|e| e.target == target)
    }

    pub(crate) fn renumber_embeddings(&mut self) {
        for (order, embedding) in self.embeddings.iter_mut().enumerate() {
            embedding.order = order as u32;
        }
    }
}
