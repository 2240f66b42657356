// Resolution simulator - which declaration a member name denotes on a type
// Replays promotion: breadth-first through embeddings, shallowest depth wins,
// a tie at the shallowest depth is ambiguous

use flat_graph::{MemberRef, TypeGraph, TypeId};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One way of reaching a declaration from the queried type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPath {
    /// Types walked, from the queried type to the declaring type
    pub path: Vec<TypeId>,
    pub declaration: MemberRef,
}

impl ResolvedPath {
    /// Number of embedding hops; 0 for a direct declaration
    pub fn depth(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// First embedded type on the path, `None` for a direct declaration
    pub fn via(&self) -> Option<TypeId> {
        self.path.get(1).copied()
    }

    pub fn names(&self, graph: &TypeGraph) -> Vec<String> {
        self.path
            .iter()
            .map(|&id| graph.name(id).to_string())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "paths", rename_all = "snake_case")]
pub enum Resolution {
    /// Exactly one shortest path reaches the name
    Unique(ResolvedPath),
    /// Two or more distinct paths of equal shortest length, in declaration order
    Ambiguous(Vec<ResolvedPath>),
    NotFound,
}

impl Resolution {
    pub fn is_unique(&self) -> bool {
        matches!(self, Resolution::Unique(_))
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Resolution::Ambiguous(_))
    }

    /// The effective declaration behind a unique resolution
    pub fn origin(&self, graph: &TypeGraph) -> Option<MemberRef> {
        match self {
            Resolution::Unique(path) => Some(effective_origin(graph, &path.declaration)),
            _ => None,
        }
    }
}

/// A member name visible on a type together with how it resolves
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberResolution {
    pub name: String,
    pub resolution: Resolution,
}

/// Resolve `name` on `ty`.
///
/// Embedded types are expanded in declaration order at every level, so paths
/// in an `Ambiguous` result are listed earliest-declared first. A type reached
/// twice at the same depth (a diamond) counts as two paths. Only subgraphs that
/// can still reach a declaration of `name` are expanded. A `ty` that does not
/// belong to `graph` resolves to `NotFound`.
pub fn resolve(graph: &TypeGraph, ty: TypeId, name: &str) -> Resolution {
    if graph.get(ty).is_none() {
        return Resolution::NotFound;
    }
    let mut reach: HashMap<TypeId, bool> = HashMap::new();
    if !reaches(graph, ty, name, &mut reach) {
        return Resolution::NotFound;
    }

    let mut frontier: Vec<Vec<TypeId>> = vec![vec![ty]];
    let mut depth = 0usize;

    while !frontier.is_empty() {
        let mut found: Vec<ResolvedPath> = frontier
            .iter()
            .filter_map(|path| {
                let last = *path.last()?;
                graph
                    .decl(last)
                    .declaration(name)
                    .map(|declaration| ResolvedPath {
                        path: path.clone(),
                        declaration,
                    })
            })
            .collect();

        if found.len() > 1 {
            log::trace!(
                "`{}` on {} is ambiguous at depth {} ({} paths)",
                name,
                graph.name(ty),
                depth,
                found.len()
            );
            return Resolution::Ambiguous(found);
        }
        if let Some(single) = found.pop() {
            return Resolution::Unique(single);
        }

        let mut next_frontier = Vec::new();
        for path in &frontier {
            let Some(&last) = path.last() else {
                continue;
            };
            for next in graph.embedded(last) {
                if reaches(graph, next, name, &mut reach) {
                    let mut extended = path.clone();
                    extended.push(next);
                    next_frontier.push(extended);
                }
            }
        }
        frontier = next_frontier;
        depth += 1;
    }

    Resolution::NotFound
}

/// Whether `name` is declared on `id` or anywhere below it
fn reaches(
    graph: &TypeGraph,
    id: TypeId,
    name: &str,
    memo: &mut HashMap<TypeId, bool>,
) -> bool {
    if let Some(&known) = memo.get(&id) {
        return known;
    }
    let embedded: Vec<TypeId> = graph.embedded(id).collect();
    let found = graph.decl(id).declares(name)
        || embedded
            .into_iter()
            .any(|next| reaches(graph, next, name, memo));
    memo.insert(id, found);
    found
}

/// Follow forwarding members to the declaration they ultimately stand in for
pub fn effective_origin(graph: &TypeGraph, member: &MemberRef) -> MemberRef {
    let mut current = member.clone();
    let mut seen = HashSet::new();

    while seen.insert(current.clone()) {
        match graph
            .get(current.owner)
            .and_then(|decl| decl.forward_target(&current.name))
        {
            Some(next) => current = next.clone(),
            None => break,
        }
    }
    current
}

/// Every member name visible on `ty` (declared or promoted), in discovery
/// order, each with its resolution. Empty when `ty` is not in `graph`.
pub fn visible_members(graph: &TypeGraph, ty: TypeId) -> Vec<MemberResolution> {
    if graph.get(ty).is_none() {
        return Vec::new();
    }
    let mut names: Vec<String> = Vec::new();
    let mut seen_names: HashSet<String> = HashSet::new();
    let mut seen_types: HashSet<TypeId> = HashSet::new();
    let mut level = vec![ty];

    while !level.is_empty() {
        let mut next = Vec::new();
        for id in level {
            if !seen_types.insert(id) {
                continue;
            }
            for name in graph.decl(id).member_names() {
                if seen_names.insert(name.to_string()) {
                    names.push(name.to_string());
                }
            }
            next.extend(graph.embedded(id));
        }
        level = next;
    }

    names
        .into_iter()
        .map(|name| {
            let resolution = resolve(graph, ty, &name);
            MemberResolution { name, resolution }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flat_graph::{GraphDocument, MemberKind, MemberPath};

    fn graph(build: impl FnOnce(&mut GraphDocument)) -> TypeGraph {
        let mut doc = GraphDocument::new();
        build(&mut doc);
        TypeGraph::from_document(&doc).unwrap()
    }

    fn vehicles() -> TypeGraph {
        graph(|doc| {
            doc.add_type("Vehiculo")
                .field("marca", "string")
                .method("Arrancar", "func()");
            doc.add_type("Auto")
                .embeds("Vehiculo")
                .field("puertas", "int")
                .method("MostrarInfo", "func()");
            doc.add_type("Camion")
                .embeds("Auto")
                .field("cargaMaxima", "int")
                .method("MostrarInfo", "func()");
        })
    }

    #[test]
    fn test_promoted_field_resolves_through_chain() {
        let g = vehicles();
        let camion = g.require("Camion").unwrap();
        let auto = g.require("Auto").unwrap();
        let vehiculo = g.require("Vehiculo").unwrap();

        match resolve(&g, camion, "marca") {
            Resolution::Unique(path) => {
                assert_eq!(path.path, vec![camion, auto, vehiculo]);
                assert_eq!(path.depth(), 2);
                assert_eq!(path.via(), Some(auto));
                assert_eq!(
                    path.declaration,
                    MemberRef::new(vehiculo, "marca", MemberKind::Field)
                );
            }
            other => panic!("expected unique, got {:?}", other),
        }
    }

    #[test]
    fn test_direct_declaration_shadows_promoted() {
        let g = vehicles();
        let camion = g.require("Camion").unwrap();
        let resolution = resolve(&g, camion, "MostrarInfo");
        let origin = resolution.origin(&g).unwrap();
        assert_eq!(origin.owner, camion);
        assert_eq!(origin.kind, MemberKind::Method);
    }

    #[test]
    fn test_missing_member() {
        let g = vehicles();
        let auto = g.require("Auto").unwrap();
        assert_eq!(resolve(&g, auto, "cargaMaxima"), Resolution::NotFound);
    }

    #[test]
    fn test_equal_depth_collision_is_ambiguous() {
        let g = graph(|doc| {
            doc.add_type("Motor").field("potencia", "int");
            doc.add_type("Bateria").field("potencia", "int");
            doc.add_type("Hibrido").embeds("Motor").embeds("Bateria");
        });
        let hibrido = g.require("Hibrido").unwrap();
        match resolve(&g, hibrido, "potencia") {
            Resolution::Ambiguous(paths) => {
                assert_eq!(paths.len(), 2);
                // declaration order is preserved
                assert_eq!(paths[0].via(), g.lookup("Motor"));
                assert_eq!(paths[1].via(), g.lookup("Bateria"));
            }
            other => panic!("expected ambiguous, got {:?}", other),
        }
    }

    #[test]
    fn test_shallower_declaration_wins_over_deeper() {
        let g = graph(|doc| {
            doc.add_type("Base").field("id", "int");
            doc.add_type("Mid").embeds("Base");
            doc.add_type("Other").field("id", "string");
            doc.add_type("Top").embeds("Mid").embeds("Other");
        });
        let top = g.require("Top").unwrap();
        let origin = resolve(&g, top, "id").origin(&g).unwrap();
        assert_eq!(origin.owner, g.require("Other").unwrap());
    }

    #[test]
    fn test_diamond_counts_as_two_paths() {
        let g = graph(|doc| {
            doc.add_type("Base").field("id", "int");
            doc.add_type("Left").embeds("Base");
            doc.add_type("Right").embeds("Base");
            doc.add_type("Both").embeds("Left").embeds("Right");
        });
        let both = g.require("Both").unwrap();
        assert!(resolve(&g, both, "id").is_ambiguous());
    }

    #[test]
    fn test_forwarder_reports_original_origin() {
        let g = graph(|doc| {
            doc.add_type("Vehiculo").field("marca", "string");
            doc.add_type("Flat")
                .forwarding_field("marca", "string", MemberPath::new("Vehiculo", "marca"));
            doc.add_type("Camion").embeds("Flat");
        });
        let camion = g.require("Camion").unwrap();
        let resolution = resolve(&g, camion, "marca");
        let origin = resolution.origin(&g).unwrap();
        assert_eq!(g.display_member(&origin), "Vehiculo.marca");
    }

    #[test]
    fn test_visible_members_in_discovery_order() {
        let g = vehicles();
        let camion = g.require("Camion").unwrap();
        let names: Vec<String> = visible_members(&g, camion)
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(
            names,
            vec!["cargaMaxima", "MostrarInfo", "puertas", "marca", "Arrancar"]
        );
    }

    /// `levels` diamonds stacked on top of each other; `D0` declares `x`
    fn stacked_diamonds(levels: usize) -> TypeGraph {
        graph(|doc| {
            doc.add_type("D0").field("x", "int");
            for k in 1..=levels {
                doc.add_type(format!("L{}", k)).embeds(format!("D{}", k - 1));
                doc.add_type(format!("R{}", k)).embeds(format!("D{}", k - 1));
                doc.add_type(format!("D{}", k))
                    .embeds(format!("L{}", k))
                    .embeds(format!("R{}", k));
            }
            doc.add_type("Side").field("side", "int");
            doc.add_type("Top")
                .embeds(format!("D{}", levels))
                .embeds("Side");
        })
    }

    #[test]
    fn test_missing_name_on_stacked_diamonds() {
        let g = stacked_diamonds(48);
        let top = g.require("Top").unwrap();
        assert_eq!(resolve(&g, top, "missing"), Resolution::NotFound);
    }

    #[test]
    fn test_branches_without_the_name_are_skipped() {
        let g = stacked_diamonds(48);
        let top = g.require("Top").unwrap();
        match resolve(&g, top, "side") {
            Resolution::Unique(path) => assert_eq!(path.names(&g), vec!["Top", "Side"]),
            other => panic!("expected unique, got {:?}", other),
        }
    }

    #[test]
    fn test_foreign_type_id_is_not_found() {
        let big = vehicles();
        let small = graph(|doc| {
            doc.add_type("Solo").field("marca", "string");
        });
        let camion = big.require("Camion").unwrap();
        assert_eq!(resolve(&small, camion, "marca"), Resolution::NotFound);
        assert!(visible_members(&small, camion).is_empty());
    }
}
