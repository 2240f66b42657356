// Rewrite plan - the data a flattening produces
// Nothing here touches a graph until `apply` is called

use flat_graph::{apply_edits, Edit, GraphResult, MemberPath, TypeGraph};
use serde::{Deserialize, Serialize};

/// An ambiguous member the rewriter refused to settle on its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualResolutionRequired {
    pub type_name: String,
    pub member: String,
    /// Conflicting paths as type names, earliest-declared first
    pub paths: Vec<Vec<String>>,
}

/// Audit record for an ambiguity settled by `auto_resolve_ambiguity`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoResolution {
    pub type_name: String,
    pub member: String,
    pub chosen: Vec<String>,
    pub origin: MemberPath,
    pub discarded: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewritePlan {
    pub edits: Vec<Edit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manual: Vec<ManualResolutionRequired>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auto_resolved: Vec<AutoResolution>,
    /// Types left over the depth limit because flattening them would settle
    /// a marked ambiguity
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unflattened: Vec<String>,
}

impl RewritePlan {
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
            && self.manual.is_empty()
            && self.auto_resolved.is_empty()
            && self.unflattened.is_empty()
    }

    /// True when part of the rewrite is left to the caller
    pub fn requires_manual_resolution(&self) -> bool {
        !self.manual.is_empty()
    }

    pub fn is_marked(&self, type_name: &str, member: &str) -> bool {
        self.manual
            .iter()
            .any(|m| m.type_name == type_name && m.member == member)
    }

    pub fn auto_resolution(&self, type_name: &str, member: &str) -> Option<&AutoResolution> {
        self.auto_resolved
            .iter()
            .find(|a| a.type_name == type_name && a.member == member)
    }

    /// Names of the types the plan creates
    pub fn synthesized_types(&self) -> impl Iterator<Item = &str> {
        self.edits.iter().filter_map(|edit| match edit {
            Edit::SynthesizeType { name } => Some(name.as_str()),
            _ => None,
        })
    }

    /// Apply the plan's edits to a copy of `graph`. Members under a
    /// manual-resolution marker have no edits and stay as they are.
    pub fn apply(&self, graph: &TypeGraph) -> GraphResult<TypeGraph> {
        apply_edits(graph, &self.edits)
    }

    pub fn is_unflattened(&self, type_name: &str) -> bool {
        self.unflattened.iter().any(|t| t == type_name)
    }

    /// Append a step's output; a member already marked keeps its first marker
    pub(crate) fn absorb(&mut self, other: RewritePlan) {
        self.edits.extend(other.edits);
        for marker in other.manual {
            if !self.is_marked(&marker.type_name, &marker.member) {
                self.manual.push(marker);
            }
        }
        self.auto_resolved.extend(other.auto_resolved);
        self.unflattened.extend(other.unflattened);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_plan() {
        let plan = RewritePlan::default();
        assert!(plan.is_empty());
        assert!(!plan.requires_manual_resolution());
        assert_eq!(serde_json::to_string(&plan).unwrap(), r#"{"edits":[]}"#);
    }

    #[test]
    fn test_marker_lookup() {
        let plan = RewritePlan {
            edits: Vec::new(),
            manual: vec![ManualResolutionRequired {
                type_name: "Bus".to_string(),
                member: "potencia".to_string(),
                paths: vec![
                    vec!["Bus".to_string(), "Motor".to_string()],
                    vec!["Bus".to_string(), "Bateria".to_string()],
                ],
            }],
            auto_resolved: Vec::new(),
            unflattened: Vec::new(),
        };
        assert!(!plan.is_empty());
        assert!(plan.requires_manual_resolution());
        assert!(plan.is_marked("Bus", "potencia"));
        assert!(!plan.is_marked("Bus", "marca"));
    }

    #[test]
    fn test_plan_json_round_trip() {
        let plan = RewritePlan {
            edits: vec![Edit::SynthesizeType {
                name: "CamionAutoFlat".to_string(),
            }],
            ..RewritePlan::default()
        };
        let json = serde_json::to_string(&plan).unwrap();
        let back: RewritePlan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan);
        assert_eq!(back.synthesized_types().collect::<Vec<_>>(), vec!["CamionAutoFlat"]);
    }

    #[test]
    fn test_absorb_keeps_first_marker() {
        let marker = |paths: Vec<&str>| ManualResolutionRequired {
            type_name: "D".to_string(),
            member: "id".to_string(),
            paths: vec![paths.into_iter().map(String::from).collect()],
        };
        let mut plan = RewritePlan::default();
        plan.absorb(RewritePlan {
            manual: vec![marker(vec!["D", "L", "Base"])],
            ..RewritePlan::default()
        });
        plan.absorb(RewritePlan {
            manual: vec![marker(vec!["D", "R", "Base"])],
            unflattened: vec!["D".to_string()],
            ..RewritePlan::default()
        });

        assert_eq!(plan.manual.len(), 1);
        assert_eq!(plan.manual[0].paths[0], vec!["D", "L", "Base"]);
        assert!(plan.is_unflattened("D"));
    }
}
