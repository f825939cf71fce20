//! Export of generated commands: shell script file and clipboard.

use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use minijinja::{Environment, context};
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::generator::generate;
use crate::domain::{AppError, CommandStep, TemplateConfig, VmId};
use crate::ports::{ClipboardWriter, OsCatalog};

const SCRIPT_TEMPLATE_NAME: &str = "export.sh";

const SCRIPT_TEMPLATE: &str = r#"#!/bin/bash
# Proxmox VE templates generated by pveqc {{ version }}
# Generated at {{ generated_at }}
# Templates: {{ templates | length }}
set -e
{% for template in templates %}

# === {{ template.label }}: VM {{ template.vm_id }} ({{ template.name }}) ===
{% for step in template.steps %}
# {{ step.description }}
{{ step.command }}
{% endfor %}
{% endfor %}
"#;

#[derive(Debug, Serialize)]
struct ScriptTemplate<'a> {
    label: String,
    vm_id: VmId,
    name: String,
    steps: &'a [CommandStep],
}

/// Render `templates` as a commented shell script.
pub fn render_script<C: OsCatalog + ?Sized>(
    templates: &[TemplateConfig],
    catalog: &C,
    generated_at: DateTime<Utc>,
) -> Result<String, AppError> {
    let steps: Vec<Vec<CommandStep>> = templates.iter().map(|t| generate(t, catalog)).collect();
    let entries: Vec<ScriptTemplate<'_>> = templates
        .iter()
        .zip(&steps)
        .map(|(template, steps)| ScriptTemplate {
            label: catalog
                .lookup(template.os_id.as_str())
                .found()
                .map(|entry| entry.label.clone())
                .unwrap_or_else(|| template.os_id.to_string()),
            vm_id: template.vm_id,
            name: template.os_id.template_name(),
            steps,
        })
        .collect();

    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_keep_trailing_newline(true);
    env.add_template(SCRIPT_TEMPLATE_NAME, SCRIPT_TEMPLATE)
        .map_err(|e| AppError::Render(e.to_string()))?;
    let template =
        env.get_template(SCRIPT_TEMPLATE_NAME).map_err(|e| AppError::Render(e.to_string()))?;

    template
        .render(context! {
            version => env!("CARGO_PKG_VERSION"),
            generated_at => generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            templates => entries,
        })
        .map_err(|e| AppError::Render(e.to_string()))
}

/// Write a rendered script to `path` and make it executable.
pub fn write_script(path: &Path, script: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, script)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }

    debug!(path = %path.display(), "wrote export script");
    Ok(())
}

/// Result of a clipboard copy. Failure never affects batch state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Unavailable(String),
}

pub fn copy_to_clipboard<W: ClipboardWriter + ?Sized>(writer: &mut W, text: &str) -> CopyOutcome {
    match writer.copy_command(text) {
        Ok(()) => CopyOutcome::Copied,
        Err(err) => {
            warn!(error = %err, "clipboard copy failed");
            CopyOutcome::Unavailable(err.to_string())
        }
    }
}
