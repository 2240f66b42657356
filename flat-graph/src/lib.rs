// flat-graph - in-memory model of a program's type-embedding graph
// Types live in an arena addressed by TypeId; embeddings are explicit, ordered edges

pub mod document;
pub mod edit;
pub mod error;
pub mod graph;
pub mod model;

pub use document::{FieldDocument, GraphDocument, MemberPath, MethodDocument, TypeDocument};
pub use edit::{apply_edits, Edit};
pub use error::{GraphError, GraphResult};
pub use graph::TypeGraph;
pub use model::{Embedding, Field, MemberKind, MemberRef, Method, TypeDecl, TypeId};
