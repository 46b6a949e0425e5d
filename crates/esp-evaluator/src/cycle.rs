// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cycle detection over a `Project`'s nested `Local` dependency tree
//! (`spec.md` §9 "Project dependency graphs").

use esp_core::{Dependency, Project};
use std::collections::BTreeMap;

/// Walk `project`'s `Local` dependency tree depth-first. Returns the cycle
/// path (project-file URIs, root first, repeated node last) if one exists.
pub fn find_cycle(project: &Project) -> Option<Vec<String>> {
    let mut path = Vec::new();
    visit(&project.project_file_uri, &project.dependencies, &mut path)
}

fn visit(
    node: &str,
    dependencies: &BTreeMap<String, Dependency>,
    path: &mut Vec<String>,
) -> Option<Vec<String>> {
    if path.iter().any(|seen| seen == node) {
        path.push(node.to_string());
        return Some(path.clone());
    }
    path.push(node.to_string());
    for dependency in dependencies.values() {
        if let Dependency::Local {
            project_file_uri,
            dependencies: nested,
            ..
        } = dependency
        {
            if let Some(cycle) = visit(project_file_uri, nested, path) {
                return Some(cycle);
            }
        }
    }
    path.pop();
    None
}
