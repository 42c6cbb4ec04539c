//! The diagram-kind catalog.
//!
//! Kinds are what a user picks before asking the generator for a diagram.
//! Every kind except [`DiagramKind::Tikz`] produces a Mermaid dialect the
//! validator knows; `tikz` produces a LaTeX document.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use diagramcraft_parser::{DescriptionKind, Dialect, detect_dialect};

use crate::description::DiagramDescription;

/// Diagram kinds offered to the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagramKind {
    Flowchart,
    Sequence,
    Er,
    Class,
    State,
    Mindmap,
    Gantt,
    Pie,
    Journey,
    GitGraph,
    Tikz,
}

impl DiagramKind {
    /// All kinds, in catalog order.
    pub const ALL: [DiagramKind; 11] = [
        DiagramKind::Flowchart,
        DiagramKind::Sequence,
        DiagramKind::Er,
        DiagramKind::Class,
        DiagramKind::State,
        DiagramKind::Mindmap,
        DiagramKind::Gantt,
        DiagramKind::Pie,
        DiagramKind::Journey,
        DiagramKind::GitGraph,
        DiagramKind::Tikz,
    ];

    /// Wire name, as used by the generator API.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagramKind::Flowchart => "flowchart",
            DiagramKind::Sequence => "sequence",
            DiagramKind::Er => "er",
            DiagramKind::Class => "class",
            DiagramKind::State => "state",
            DiagramKind::Mindmap => "mindmap",
            DiagramKind::Gantt => "gantt",
            DiagramKind::Pie => "pie",
            DiagramKind::Journey => "journey",
            DiagramKind::GitGraph => "gitGraph",
            DiagramKind::Tikz => "tikz",
        }
    }

    /// Name shown in selection lists.
    pub fn display_name(self) -> &'static str {
        match self {
            DiagramKind::Flowchart => "Flowchart",
            DiagramKind::Sequence => "Sequence",
            DiagramKind::Er => "Er",
            DiagramKind::Class => "Class",
            DiagramKind::State => "State",
            DiagramKind::Mindmap => "Mindmap",
            DiagramKind::Gantt => "Gantt",
            DiagramKind::Pie => "Pie",
            DiagramKind::Journey => "Journey",
            DiagramKind::GitGraph => "Gitgraph",
            DiagramKind::Tikz => "Tikz",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DiagramKind::Flowchart => "Flowcharts and process diagrams",
            DiagramKind::Sequence => "Sequence diagrams for interactions",
            DiagramKind::Er => "Entity Relationship diagrams for databases",
            DiagramKind::Class => "Class diagrams for OOP structures",
            DiagramKind::State => "State diagrams for state machines",
            DiagramKind::Mindmap => "Mindmaps for brainstorming and organization",
            DiagramKind::Gantt => "Gantt charts for project timelines",
            DiagramKind::Pie => "Pie charts for data visualization",
            DiagramKind::Journey => "User journey maps for UX flows",
            DiagramKind::GitGraph => "Git workflow and branching diagrams",
            DiagramKind::Tikz => "Professional LaTeX/TikZ diagrams (for Overleaf)",
        }
    }

    /// The first line a generated description of this kind starts with.
    pub fn mermaid_prefix(self) -> &'static str {
        match self {
            DiagramKind::Flowchart => "graph TD",
            DiagramKind::Sequence => "sequenceDiagram",
            DiagramKind::Er => "erDiagram",
            DiagramKind::Class => "classDiagram",
            DiagramKind::State => "stateDiagram-v2",
            DiagramKind::Mindmap => "mindmap",
            DiagramKind::Gantt => "gantt",
            DiagramKind::Pie => "pie",
            DiagramKind::Journey => "journey",
            DiagramKind::GitGraph => "gitGraph",
            DiagramKind::Tikz => "\\documentclass{standalone}",
        }
    }

    pub fn example_prompt(self) -> &'static str {
        match self {
            DiagramKind::Flowchart => "Create a login flow with authentication and error handling",
            DiagramKind::Sequence => {
                "Show the interaction between user, frontend, backend, and database for a login request"
            }
            DiagramKind::Er => "Design a database schema for a blog with users, posts, and comments",
            DiagramKind::Class => {
                "Create a class diagram for an e-commerce system with Product, Cart, and Order classes"
            }
            DiagramKind::State => {
                "Model the states of an order: pending, processing, shipped, delivered, cancelled"
            }
            DiagramKind::Mindmap => "Create a mindmap for planning a web application project",
            DiagramKind::Gantt => "Create a project timeline for building a mobile app over 3 months",
            DiagramKind::Pie => "Show the distribution of programming languages used in a project",
            DiagramKind::Journey => {
                "Map the user journey for online shopping from browsing to checkout"
            }
            DiagramKind::GitGraph => "Show a git workflow with main, develop, and feature branches",
            DiagramKind::Tikz => {
                "Create a high-quality ER diagram for a library system using tikz-er2"
            }
        }
    }

    /// Whether a description in `dialect` is what this kind should produce.
    ///
    /// `tikz` expects a document, so it matches no dialect.
    pub fn matches_dialect(self, dialect: Dialect) -> bool {
        matches!(
            (self, dialect),
            (DiagramKind::Flowchart, Dialect::Flowchart { .. })
                | (DiagramKind::Sequence, Dialect::Sequence)
                | (DiagramKind::Er, Dialect::EntityRelationship)
                | (DiagramKind::Class, Dialect::Class)
                | (DiagramKind::State, Dialect::State)
                | (DiagramKind::Mindmap, Dialect::Mindmap)
                | (DiagramKind::Gantt, Dialect::Gantt)
                | (DiagramKind::Pie, Dialect::Pie)
                | (DiagramKind::Journey, Dialect::Journey)
                | (DiagramKind::GitGraph, Dialect::GitGraph)
        )
    }

    /// Whether `description` looks like what this kind should produce.
    ///
    /// Descriptions without a recognizable header are accepted; validation
    /// reports them.
    pub fn accepts(self, description: &DiagramDescription) -> bool {
        match description.kind() {
            DescriptionKind::Document => self.is_document(),
            DescriptionKind::Dsl => {
                !self.is_document()
                    && detect_dialect(description.text())
                        .is_none_or(|dialect| self.matches_dialect(dialect))
            }
        }
    }

    /// Whether this kind produces a document rather than a Mermaid description.
    pub fn is_document(self) -> bool {
        self == DiagramKind::Tikz
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagramKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiagramKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<_> = DiagramKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown diagram kind `{s}` (expected one of: {})", known.join(", "))
            })
    }
}

/// One catalog entry, in the generator API's JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindInfo {
    #[serde(rename = "type")]
    pub kind: DiagramKind,
    #[serde(rename = "name")]
    pub display_name: String,
    pub description: String,
    pub mermaid_prefix: String,
    pub example_prompt: String,
}

impl From<DiagramKind> for KindInfo {
    fn from(kind: DiagramKind) -> Self {
        Self {
            kind,
            display_name: kind.display_name().to_string(),
            description: kind.description().to_string(),
            mermaid_prefix: kind.mermaid_prefix().to_string(),
            example_prompt: kind.example_prompt().to_string(),
        }
    }
}

/// The built-in catalog, in display order.
pub fn catalog() -> Vec<KindInfo> {
    DiagramKind::ALL.into_iter().map(KindInfo::from).collect()
}

#[cfg(test)]
mod tests {
    use diagramcraft_parser::validate;

    use super::*;

    #[test]
    fn test_catalog_order() {
        let kinds: Vec<_> = catalog().into_iter().map(|info| info.kind).collect();
        assert_eq!(kinds, DiagramKind::ALL);
        assert_eq!(catalog()[9].display_name, "Gitgraph");
    }

    #[test]
    fn test_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&DiagramKind::GitGraph).unwrap(),
            "\"gitGraph\""
        );
        assert_eq!("gitgraph".parse::<DiagramKind>(), Ok(DiagramKind::GitGraph));
        assert_eq!("er".parse::<DiagramKind>(), Ok(DiagramKind::Er));
        assert!("venn".parse::<DiagramKind>().is_err());
    }

    #[test]
    fn test_kind_info_json_shape() {
        let json = serde_json::to_value(KindInfo::from(DiagramKind::Pie)).unwrap();
        assert_eq!(json["type"], "pie");
        assert_eq!(json["name"], "Pie");
        assert_eq!(json["mermaid_prefix"], "pie");

        let parsed: KindInfo = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.kind, DiagramKind::Pie);
    }

    #[test]
    fn test_prefixes_match_their_dialect() {
        for kind in DiagramKind::ALL.into_iter().filter(|k| !k.is_document()) {
            let dialect = validate(kind.mermaid_prefix())
                .unwrap_or_else(|err| panic!("{kind}: {err}"))
                .dialect();
            assert!(kind.matches_dialect(dialect), "{kind} vs {dialect}");
        }
    }

    #[test]
    fn test_accepts_description() {
        let sequence = DiagramDescription::new("sequenceDiagram\nA->>B: hi", 1.into(), None);
        assert!(DiagramKind::Sequence.accepts(&sequence));
        assert!(!DiagramKind::Flowchart.accepts(&sequence));
        assert!(!DiagramKind::Tikz.accepts(&sequence));

        let document = DiagramDescription::new("\\documentclass{standalone}", 2.into(), None);
        assert!(DiagramKind::Tikz.accepts(&document));
        assert!(!DiagramKind::Pie.accepts(&document));

        let headless = DiagramDescription::new("A-->B", 3.into(), None);
        assert!(DiagramKind::Flowchart.accepts(&headless));
    }

    #[test]
    fn test_tikz_matches_no_dialect() {
        assert!(!DiagramKind::Tikz.matches_dialect(Dialect::Flowchart { direction: None }));
        assert!(DiagramKind::Tikz.is_document());
    }
}
