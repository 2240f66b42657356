// Type graph - arena of type declarations plus a name index
// Construction validates names, members and acyclicity; the graph is read-only afterwards

use crate::document::{FieldDocument, GraphDocument, MemberPath, MethodDocument, TypeDocument};
use crate::error::{GraphError, GraphResult};
use crate::model::{Embedding, Field, MemberKind, MemberRef, Method, TypeDecl, TypeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The type-embedding graph of one program (or one merged set of modules).
///
/// Embeddings always form a DAG: every constructor and `apply_edits` check it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GraphDocument", into = "GraphDocument")]
pub struct TypeGraph {
    types: Vec<TypeDecl>,
    by_name: HashMap<String, TypeId>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

impl TypeGraph {
    /// Build and validate a graph from its document form
    pub fn from_document(doc: &GraphDocument) -> GraphResult<Self> {
        let mut graph = TypeGraph::default();

        for ty in &doc.types {
            let id = graph.push_type(ty.name.clone())?;
            graph.decl_mut(id).synthesized = ty.synthesized;
        }

        for (index, ty) in doc.types.iter().enumerate() {
            let id = TypeId::from_index(index);
            for target in &ty.embeds {
                let target = graph.require(target)?;
                graph.add_embedding(id, target)?;
            }
            for field in &ty.fields {
                graph.add_field(
                    id,
                    Field {
                        name: field.name.clone(),
                        ty: field.ty.clone(),
                        forwards: None,
                    },
                )?;
            }
            for method in &ty.methods {
                graph.add_method(
                    id,
                    Method {
                        name: method.name.clone(),
                        signature: method.signature.clone(),
                        forwards: None,
                    },
                )?;
            }
        }

        // Forwarders may point at types declared later in the document
        for (index, ty) in doc.types.iter().enumerate() {
            let id = TypeId::from_index(index);
            for (slot, field) in ty.fields.iter().enumerate() {
                if let Some(path) = &field.forwards {
                    let origin = graph.member_ref(path, MemberKind::Field)?;
                    graph.decl_mut(id).fields[slot].forwards = Some(origin);
                }
            }
            for (slot, method) in ty.methods.iter().enumerate() {
                if let Some(path) = &method.forwards {
                    let origin = graph.member_ref(path, MemberKind::Method)?;
                    graph.decl_mut(id).methods[slot].forwards = Some(origin);
                }
            }
        }

        graph.check_acyclic()?;
        log::debug!("built type graph with {} types", graph.len());
        Ok(graph)
    }

    /// Convert back to the document form for an external printer
    pub fn to_document(&self) -> GraphDocument {
        let path =
            |origin: &MemberRef| MemberPath::new(self.name(origin.owner), origin.name.clone());

        GraphDocument {
            types: self
                .types
                .iter()
                .map(|decl| TypeDocument {
                    name: decl.name.clone(),
                    fields: decl
                        .fields
                        .iter()
                        .map(|f| FieldDocument {
                            name: f.name.clone(),
                            ty: f.ty.clone(),
                            forwards: f.forwards.as_ref().map(path),
                        })
                        .collect(),
                    methods: decl
                        .methods
                        .iter()
                        .map(|m| MethodDocument {
                            name: m.name.clone(),
                            signature: m.signature.clone(),
                            forwards: m.forwards.as_ref().map(path),
                        })
                        .collect(),
                    embeds: decl
                        .embeddings
                        .iter()
                        .map(|e| self.name(e.target).to_string())
                        .collect(),
                    synthesized: decl.synthesized,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        (0..self.types.len()).map(TypeId::from_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDecl> {
        self.types.iter()
    }

    /// Declaration for an id minted by this graph (or a graph it was derived from).
    ///
    /// # Panics
    ///
    /// Panics if `id` came from an unrelated graph. Use [`TypeGraph::get`] for
    /// ids of unknown provenance.
    pub fn decl(&self, id: TypeId) -> &TypeDecl {
        &self.types[id.index()]
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeDecl> {
        self.types.get(id.index())
    }

    /// Name of `id`; same precondition as [`TypeGraph::decl`]
    pub fn name(&self, id: TypeId) -> &str {
        &self.decl(id).name
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Like `lookup`, but a missing name is an `UnknownType` error
    pub fn require(&self, name: &str) -> GraphResult<TypeId> {
        self.lookup(name).ok_or_else(|| GraphError::UnknownType {
            name: name.to_string(),
        })
    }

    pub fn type_names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.name.as_str()).collect()
    }

    /// Embedded types of `id`, in declaration order
    pub fn embedded(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.decl(id).embeddings.iter().map(|e| e.target)
    }

    /// Types that directly embed `id`
    pub fn embedders(&self, id: TypeId) -> Vec<TypeId> {
        self.types
            .iter()
            .filter(|decl| decl.embeds(id))
            .map(|decl| decl.id)
            .collect()
    }

    /// Every embedding edge as (owner, target, declaration index)
    pub fn edges(&self) -> impl Iterator<Item = (TypeId, TypeId, u32)> + '_ {
        self.types.iter().flat_map(|decl| {
            decl.embeddings
                .iter()
                .map(move |e| (decl.id, e.target, e.order))
        })
    }

    /// `Owner.member` rendering of a declaration
    pub fn display_member(&self, member: &MemberRef) -> String {
        format!("{}.{}", self.name(member.owner), member.name)
    }

    /// Resolve a by-name member path against this graph
    pub fn member_ref(&self, path: &MemberPath, kind: MemberKind) -> GraphResult<MemberRef> {
        let owner = self.require(&path.type_name)?;
        self.decl(owner)
            .declaration(&path.member)
            .filter(|decl| decl.kind == kind)
            .ok_or_else(|| GraphError::UnknownMember {
                type_name: path.type_name.clone(),
                member: path.member.clone(),
            })
    }

    /// Fails with `CyclicEmbedding` naming the first cycle found
    pub fn check_acyclic(&self) -> GraphResult<()> {
        let mut marks = vec![Mark::Unvisited; self.types.len()];
        let mut stack = Vec::new();

        for id in self.ids() {
            if marks[id.index()] == Mark::Unvisited {
                self.visit(id, &mut marks, &mut stack)?;
            }
        }
        Ok(())
    }

    fn visit(&self, id: TypeId, marks: &mut [Mark], stack: &mut Vec<TypeId>) -> GraphResult<()> {
        marks[id.index()] = Mark::InProgress;
        stack.push(id);

        for target in self.embedded(id) {
            match marks[target.index()] {
                Mark::InProgress => {
                    let start = stack.iter().position(|&t| t == target).unwrap_or(0);
                    let mut cycle: Vec<String> = stack[start..]
                        .iter()
                        .map(|&t| self.name(t).to_string())
                        .collect();
                    cycle.push(self.name(target).to_string());
                    return Err(GraphError::CyclicEmbedding { cycle });
                }
                Mark::Unvisited => self.visit(target, marks, stack)?,
                Mark::Done => {}
            }
        }

        stack.pop();
        marks[id.index()] = Mark::Done;
        Ok(())
    }

    pub(crate) fn push_type(&mut self, name: String) -> GraphResult<TypeId> {
        if self.by_name.contains_key(&name) {
            return Err(GraphError::DuplicateType { name });
        }
        let id = TypeId::from_index(self.types.len());
        self.by_name.insert(name.clone(), id);
        self.types.push(TypeDecl::new(id, name));
        Ok(id)
    }

    pub(crate) fn decl_mut(&mut self, id: TypeId) -> &mut TypeDecl {
        &mut self.types[id.index()]
    }

    pub(crate) fn add_embedding(&mut self, owner: TypeId, target: TypeId) -> GraphResult<()> {
        if self.decl(owner).embeds(target) {
            return Err(self.duplicate_member(owner, self.name(target).to_string()));
        }
        let decl = self.decl_mut(owner);
        let order = decl.embeddings.len() as u32;
        decl.embeddings.push(Embedding { target, order });
        Ok(())
    }

    pub(crate) fn add_field(&mut self, owner: TypeId, field: Field) -> GraphResult<()> {
        if self.decl(owner).declares(&field.name) {
            return Err(self.duplicate_member(owner, field.name));
        }
        self.decl_mut(owner).fields.push(field);
        Ok(())
    }

    pub(crate) fn add_method(&mut self, owner: TypeId, method: Method) -> GraphResult<()> {
        if self.decl(owner).declares(&method.name) {
            return Err(self.duplicate_member(owner, method.name));
        }
        self.decl_mut(owner).methods.push(method);
        Ok(())
    }

    fn duplicate_member(&self, owner: TypeId, member: String) -> GraphError {
        GraphError::DuplicateMember {
            owner: self.name(owner).to_string(),
            member,
        }
    }
}

impl TryFrom<GraphDocument> for TypeGraph {
    type Error = GraphError;

    fn try_from(doc: GraphDocument) -> GraphResult<Self> {
        TypeGraph::from_document(&doc)
    }
}

impl From<TypeGraph> for GraphDocument {
    fn from(graph: TypeGraph) -> Self {
        graph.to_document()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicles() -> GraphDocument {
        let mut doc = GraphDocument::new();
        doc.add_type("Vehiculo").field("marca", "string");
        doc.add_type("Auto").embeds("Vehiculo").field("puertas", "int");
        doc.add_type("Camion").embeds("Auto").field("cargaMaxima", "int");
        doc
    }

    #[test]
    fn test_build_indexes_types() {
        let graph = TypeGraph::from_document(&vehicles()).unwrap();
        assert_eq!(graph.len(), 3);

        let auto = graph.require("Auto").unwrap();
        let vehiculo = graph.require("Vehiculo").unwrap();
        assert_eq!(graph.embedded(auto).collect::<Vec<_>>(), vec![vehiculo]);
        assert_eq!(graph.embedders(vehiculo), vec![auto]);
        assert_eq!(graph.edges().count(), 2);
    }

    #[test]
    fn test_unknown_embed_target() {
        let mut doc = GraphDocument::new();
        doc.add_type("Auto").embeds("Vehicul");
        let err = TypeGraph::from_document(&doc).unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownType {
                name: "Vehicul".to_string()
            }
        );
    }

    #[test]
    fn test_two_type_cycle_detected() {
        let mut doc = GraphDocument::new();
        doc.add_type("A").embeds("B");
        doc.add_type("B").embeds("A");
        let err = TypeGraph::from_document(&doc).unwrap_err();
        assert_eq!(
            err,
            GraphError::CyclicEmbedding {
                cycle: vec!["A".to_string(), "B".to_string(), "A".to_string()]
            }
        );
    }

    #[test]
    fn test_self_embedding_is_a_cycle() {
        let mut doc = GraphDocument::new();
        doc.add_type("A").embeds("A");
        assert!(matches!(
            TypeGraph::from_document(&doc),
            Err(GraphError::CyclicEmbedding { .. })
        ));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let mut doc = GraphDocument::new();
        doc.add_type("Base");
        doc.add_type("Left").embeds("Base");
        doc.add_type("Right").embeds("Base");
        doc.add_type("Both").embeds("Left").embeds("Right");
        assert!(TypeGraph::from_document(&doc).is_ok());
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut doc = GraphDocument::new();
        doc.add_type("A");
        doc.add_type("A");
        assert!(matches!(
            TypeGraph::from_document(&doc),
            Err(GraphError::DuplicateType { .. })
        ));

        let mut doc = GraphDocument::new();
        doc.add_type("A").field("x", "int").method("x", "func()");
        assert!(matches!(
            TypeGraph::from_document(&doc),
            Err(GraphError::DuplicateMember { .. })
        ));
    }

    #[test]
    fn test_forwarder_to_later_type() {
        let mut doc = GraphDocument::new();
        doc.add_type("Flat")
            .forwarding_field("marca", "string", MemberPath::new("Vehiculo", "marca"));
        doc.add_type("Vehiculo").field("marca", "string");

        let graph = TypeGraph::from_document(&doc).unwrap();
        let flat = graph.decl(graph.require("Flat").unwrap());
        let origin = flat.forward_target("marca").unwrap();
        assert_eq!(graph.display_member(origin), "Vehiculo.marca");
    }

    #[test]
    fn test_forwarder_to_missing_member() {
        let mut doc = GraphDocument::new();
        doc.add_type("Vehiculo").field("marca", "string");
        doc.add_type("Flat")
            .forwarding_field("modelo", "string", MemberPath::new("Vehiculo", "modelo"));
        assert!(matches!(
            TypeGraph::from_document(&doc),
            Err(GraphError::UnknownMember { .. })
        ));
    }

    #[test]
    fn test_document_round_trip() {
        let doc = vehicles();
        let graph = TypeGraph::from_document(&doc).unwrap();
        assert_eq!(graph.to_document(), doc);
    }
}
