// Graph document - the serde exchange shape between front-end, engine and printer
// Types reference each other by name; `TypeGraph::from_document` validates and indexes them

use serde::{Deserialize, Serialize};

/// Names a member declared on a type: `Vehiculo.marca`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberPath {
    #[serde(rename = "type")]
    pub type_name: String,
    pub member: String,
}

impl MemberPath {
    pub fn new(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            member: member.into(),
        }
    }
}

impl std::fmt::Display for MemberPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.type_name, self.member)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub types: Vec<TypeDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodDocument>,
    /// Embedded type names, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub synthesized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forwards: Option<MemberPath>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDocument {
    pub name: String,
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forwards: Option<MemberPath>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl GraphDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a type and return it for further building
    pub fn add_type(&mut self, name: impl Into<String>) -> &mut TypeDocument {
        let index = self.types.len();
        self.types.push(TypeDocument::new(name));
        &mut self.types[index]
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Concatenate several documents into one, e.g. one per source module.
    /// Cross-document embeddings resolve once the merged document is built.
    pub fn merge(documents: impl IntoIterator<Item = GraphDocument>) -> Self {
        Self {
            types: documents.into_iter().flat_map(|doc| doc.types).collect(),
        }
    }
}

impl TypeDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn embeds(&mut self, target: impl Into<String>) -> &mut Self {
        self.embeds.push(target.into());
        self
    }

    pub fn field(&mut self, name: impl Into<String>, ty: impl Into<String>) -> &mut Self {
        self.fields.push(FieldDocument {
            name: name.into(),
            ty: ty.into(),
            forwards: None,
        });
        self
    }

    pub fn method(&mut self, name: impl Into<String>, signature: impl Into<String>) -> &mut Self {
        self.methods.push(MethodDocument {
            name: name.into(),
            signature: signature.into(),
            forwards: None,
        });
        self
    }

    pub fn forwarding_field(
        &mut self,
        name: impl Into<String>,
        ty: impl Into<String>,
        origin: MemberPath,
    ) -> &mut Self {
        self.fields.push(FieldDocument {
            name: name.into(),
            ty: ty.into(),
            forwards: Some(origin),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_json_shape() {
        let mut doc = GraphDocument::new();
        doc.add_type("Vehiculo").field("marca", "string");
        doc.add_type("Auto")
            .embeds("Vehiculo")
            .field("puertas", "int")
            .method("MostrarInfo", "func()");

        let json = doc.to_json_pretty().unwrap();
        assert!(json.contains("\"type\": \"string\""));
        assert!(json.contains("\"embeds\""));
        assert!(!json.contains("synthesized"));

        let back = GraphDocument::from_json(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let doc = GraphDocument::from_json(r#"{"types":[{"name":"A"}]}"#).unwrap();
        assert_eq!(doc.types.len(), 1);
        assert!(doc.types[0].fields.is_empty());
        assert!(doc.types[0].embeds.is_empty());
    }

    #[test]
    fn test_merge_keeps_order() {
        let mut a = GraphDocument::new();
        a.add_type("A");
        let mut b = GraphDocument::new();
        b.add_type("B").embeds("A");

        let merged = GraphDocument::merge(vec![a, b]);
        let names: Vec<&str> = merged.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
