// Graph documents as produced by an external front-end

use flat_graph::{GraphDocument, GraphError, MemberKind, TypeGraph};

const VEHICLES: &str = r#"{
  "types": [
    { "name": "Vehiculo",
      "fields": [ { "name": "Marca", "type": "string" }, { "name": "Modelo", "type": "string" } ],
      "methods": [ { "name": "Arrancar", "signature": "func()" }, { "name": "Detener", "signature": "func()" } ] },
    { "name": "Auto", "embeds": ["Vehiculo"],
      "fields": [ { "name": "Puertas", "type": "int" } ],
      "methods": [ { "name": "MostrarInfo", "signature": "func()" } ] },
    { "name": "Camion", "embeds": ["Auto"],
      "fields": [ { "name": "CargaMaxima", "type": "int" } ],
      "methods": [ { "name": "MostrarInfo", "signature": "func()" } ] }
  ]
}"#;

#[test]
fn test_graph_deserializes_through_document() {
    let graph: TypeGraph = serde_json::from_str(VEHICLES).expect("valid graph");
    assert_eq!(graph.len(), 3);

    let camion = graph.require("Camion").unwrap();
    let decl = graph.decl(camion);
    assert_eq!(
        decl.declaration("MostrarInfo").map(|m| m.kind),
        Some(MemberKind::Method)
    );
    assert_eq!(decl.embeddings().len(), 1);
}

#[test]
fn test_graph_serializes_back_to_same_document() {
    let graph: TypeGraph = serde_json::from_str(VEHICLES).unwrap();
    let json = serde_json::to_string(&graph).unwrap();
    let reparsed = GraphDocument::from_json(&json).unwrap();
    let original = GraphDocument::from_json(VEHICLES).unwrap();
    assert_eq!(reparsed, original);
}

#[test]
fn test_cyclic_document_fails_to_deserialize() {
    let json = r#"{"types":[{"name":"A","embeds":["B"]},{"name":"B","embeds":["A"]}]}"#;
    let result: Result<TypeGraph, _> = serde_json::from_str(json);
    let err = result.unwrap_err();
    assert!(err.to_string().contains("cyclic embedding"));

    let doc = GraphDocument::from_json(json).unwrap();
    assert!(matches!(
        TypeGraph::from_document(&doc),
        Err(GraphError::CyclicEmbedding { .. })
    ));
}

#[test]
fn test_merged_modules_resolve_cross_references() {
    let base = GraphDocument::from_json(r#"{"types":[{"name":"Vehiculo","fields":[{"name":"marca","type":"string"}]}]}"#).unwrap();
    let derived = GraphDocument::from_json(r#"{"types":[{"name":"Moto","embeds":["Vehiculo"]}]}"#).unwrap();

    assert!(TypeGraph::from_document(&derived).is_err());

    let merged = GraphDocument::merge(vec![base, derived]);
    let graph = TypeGraph::from_document(&merged).unwrap();
    let moto = graph.require("Moto").unwrap();
    assert_eq!(graph.embedded(moto).count(), 1);
}
