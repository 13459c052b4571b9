use cougar_args::Evaluation;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::Write as _;

/// What `cougar eval` prints for a successful evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    /// Names along the evaluated path, root first, joined by spaces.
    pub path: String,
    /// Commands whose callback ran, in dispatch order.
    pub dispatched: Vec<String>,
    pub nodes: Vec<NodeReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub name: String,
    /// Flag as written (`-v`, `--revision`) to its value. A repeated flag
    /// keeps its first position and its last value.
    pub options: IndexMap<String, Option<String>>,
    pub parameters: Vec<String>,
}

impl EvalReport {
    pub fn new(evaluation: &Evaluation<'_>, dispatched: Vec<String>) -> Self {
        let nodes: Vec<NodeReport> = evaluation
            .chain()
            .into_iter()
            .map(|node| NodeReport {
                name: node.name().to_string(),
                options: node
                    .options
                    .iter()
                    .map(|o| (o.flag.to_string(), o.value.clone()))
                    .collect(),
                parameters: node.parameters.clone(),
            })
            .collect();
        let path = nodes
            .iter()
            .map(|n| n.name.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            path,
            dispatched,
            nodes,
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for (depth, node) in self.nodes.iter().enumerate() {
            let indent = "  ".repeat(depth);
            let _ = writeln!(out, "{indent}{}", node.name);
            for (flag, value) in &node.options {
                match value {
                    Some(value) => {
                        let _ = writeln!(out, "{indent}  option {flag} = {value}");
                    }
                    None => {
                        let _ = writeln!(out, "{indent}  option {flag}");
                    }
                }
            }
            for (index, parameter) in node.parameters.iter().enumerate() {
                let _ = writeln!(out, "{indent}  parameter[{index}] {parameter}");
            }
        }
        if !self.dispatched.is_empty() {
            let _ = writeln!(out, "dispatched: {}", self.dispatched.join(", "));
        }
        out
    }
}
