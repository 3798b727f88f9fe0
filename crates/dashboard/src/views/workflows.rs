use farmvibes_common::Workflow;

use super::truncate;

/// Catalog listing, optionally narrowed by a case-insensitive search term
/// matched against name and description.
pub fn render_catalog(workflows: &[Workflow], search: Option<&str>) -> String {
    let needle = search.map(str::to_lowercase).filter(|s| !s.trim().is_empty());
    let matching: Vec<&Workflow> = workflows
        .iter()
        .filter(|wf| match &needle {
            Some(needle) => {
                wf.name.to_lowercase().contains(needle)
                    || wf.description.to_lowercase().contains(needle)
            }
            None => true,
        })
        .collect();

    if matching.is_empty() {
        return match search {
            Some(term) => format!("No workflows match '{term}'."),
            None => "No workflows available.".to_string(),
        };
    }

    let width = matching.iter().map(|wf| wf.name.len()).max().unwrap_or(0);
    let mut lines = vec![format!("Workflows ({})", matching.len())];
    for wf in matching {
        lines.push(format!(
            "  {:<width$}  {}",
            wf.name,
            truncate(&wf.description, 60)
        ));
    }
    lines.join("\n")
}

pub fn render_description(workflow: &Workflow) -> String {
    let mut lines = vec![workflow.name.clone()];
    if !workflow.description.is_empty() {
        lines.push(workflow.description.clone());
    }

    lines.push(String::new());
    if workflow.inputs.is_empty() {
        lines.push("Inputs: none".to_string());
    } else {
        lines.push("Inputs:".to_string());
        for input in &workflow.inputs {
            let requirement = match (&input.default, input.required) {
                (Some(default), _) => format!("default {default}"),
                (None, true) => "required".to_string(),
                (None, false) => "optional".to_string(),
            };
            let mut line = format!("  {} ({}, {requirement})", input.name, input.input_type);
            if let Some(description) = &input.description {
                line.push_str(&format!(" - {description}"));
            }
            lines.push(line);
        }
    }

    if !workflow.outputs.is_empty() {
        lines.push("Outputs:".to_string());
        for output in &workflow.outputs {
            let mut line = format!("  {} ({})", output.name, output.output_type);
            if let Some(description) = &output.description {
                line.push_str(&format!(" - {description}"));
            }
            lines.push(line);
        }
    }
    lines.join("\n")
}
