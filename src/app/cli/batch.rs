//! Batch subcommands.

use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;

use crate::app::api::{self, BatchAction, BatchOutcome, BatchReport, CopyOutcome};
use crate::app::commands::batch::{apply, report};
use crate::app::commands::export::render_script;
use crate::domain::generator::generate;
use crate::domain::{AppError, BaseField, OsId, SelectionChange};

#[derive(Subcommand)]
pub enum BatchCommands {
    /// Select or deselect OS images
    #[clap(visible_alias = "t")]
    Toggle {
        /// OS image ids, e.g. ubuntu-22.04 rocky-9
        #[arg(required = true)]
        os: Vec<String>,
    },
    /// Toggle a whole OS group (e.g. "Rocky Linux")
    Group { label: String },
    /// Select every catalog image
    SelectAll,
    /// Deselect everything and drop all templates
    ClearSelection,
    /// Change a base field: vm-id, storage, bridge, guest-agent, root-ssh
    Set {
        #[arg(value_parser = parse_field)]
        field: BaseField,
        value: String,
    },
    /// Show the batch
    #[clap(visible_alias = "s")]
    Show {
        /// Print the report as JSON
        #[arg(long, conflicts_with = "steps")]
        json: bool,
        /// List every step of every template
        #[arg(long)]
        steps: bool,
    },
    /// Empty the template list but keep the selection
    Clear,
    /// Remove all persisted batch state
    Reset,
    /// Export the merged command
    Export {
        /// Copy the merged command to the clipboard
        #[arg(long)]
        copy: bool,
        /// Write a shell script to FILE
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn parse_field(raw: &str) -> Result<BaseField, String> {
    raw.parse::<BaseField>().map_err(|e| e.to_string())
}

impl BatchCommands {
    fn into_actions(self) -> Vec<BatchAction> {
        match self {
            BatchCommands::Toggle { os } => os.into_iter().map(BatchAction::Toggle).collect(),
            BatchCommands::Group { label } => vec![BatchAction::Group(label)],
            BatchCommands::SelectAll => vec![BatchAction::SelectAll],
            BatchCommands::ClearSelection => vec![BatchAction::ClearSelection],
            BatchCommands::Set { field, value } => vec![BatchAction::Set { field, value }],
            BatchCommands::Clear => vec![BatchAction::ClearTemplates],
            BatchCommands::Reset => vec![BatchAction::Reset],
            BatchCommands::Show { .. } | BatchCommands::Export { .. } => Vec::new(),
        }
    }
}

pub fn run_batch(state_dir: PathBuf, command: BatchCommands) -> Result<(), AppError> {
    match command {
        BatchCommands::Show { json, steps } => run_show(state_dir, json, steps),
        BatchCommands::Export { copy, output } => run_export(state_dir, copy, output),
        other => {
            let mut session = api::open_batch_at(state_dir)?;
            for action in other.into_actions() {
                let outcome = apply(&mut session, action)?;
                print_outcome(&outcome);
            }
            print_summary(&report(&session));
            Ok(())
        }
    }
}

fn run_show(state_dir: PathBuf, json: bool, steps: bool) -> Result<(), AppError> {
    let session = api::open_batch_at(state_dir)?;
    let batch_report = report(&session);

    if json {
        let rendered =
            serde_json::to_string_pretty(&batch_report).map_err(|e| AppError::Serialization {
                what: "batch report".to_string(),
                details: e.to_string(),
            })?;
        println!("{}", rendered);
        return Ok(());
    }

    print_base(&batch_report);
    print_summary(&batch_report);

    if steps {
        for template in session.state().templates() {
            println!();
            println!("== VM {} ({}) ==", template.vm_id, template.os_id);
            for (index, step) in generate(template, session.catalog()).iter().enumerate() {
                println!("# {}. {}", index + 1, step.description);
                println!("{}", step.command);
            }
        }
    }
    Ok(())
}

fn run_export(state_dir: PathBuf, copy: bool, output: Option<PathBuf>) -> Result<(), AppError> {
    let session = api::open_batch_at(state_dir)?;
    let batch_report = report(&session);
    if batch_report.merged_command.is_empty() {
        println!("⚠️  Batch has no templates; nothing to export");
        return Ok(());
    }
    warn_duplicates(&batch_report);

    if let Some(path) = &output {
        let script = render_script(session.state().templates(), session.catalog(), Utc::now())?;
        api::write_script(path, &script)?;
        println!("✅ Wrote {} template(s) to {}", batch_report.templates.len(), path.display());
    }
    if copy {
        match api::copy_to_clipboard(&batch_report.merged_command) {
            CopyOutcome::Copied => println!("✅ Copied merged command to clipboard"),
            CopyOutcome::Unavailable(reason) => {
                println!("⚠️  Could not copy to clipboard: {}", reason)
            }
        }
    }
    if output.is_none() && !copy {
        println!("{}", batch_report.merged_command);
    }
    Ok(())
}

fn join_ids(ids: &[OsId]) -> String {
    ids.iter().map(OsId::as_str).collect::<Vec<_>>().join(", ")
}

fn print_outcome(outcome: &BatchOutcome) {
    match outcome {
        BatchOutcome::Selection(SelectionChange::Selected(ids)) if ids.is_empty() => {
            println!("✅ Nothing to select; already selected")
        }
        BatchOutcome::Selection(SelectionChange::Selected(ids)) => {
            println!("✅ Selected {}", join_ids(ids))
        }
        BatchOutcome::Selection(SelectionChange::Deselected(ids)) => {
            println!("✅ Deselected {}", join_ids(ids))
        }
        BatchOutcome::Updated { field } => println!("✅ Updated {}", field),
        BatchOutcome::ClearedSelection => println!("✅ Cleared selection and templates"),
        BatchOutcome::ClearedTemplates => println!("✅ Cleared template list (selection kept)"),
        BatchOutcome::Reset => println!("✅ Reset batch to defaults"),
    }
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

fn print_base(batch_report: &BatchReport) {
    let base = &batch_report.base;
    println!("Base configuration:");
    println!("  vm-id:       {}", base.vm_id);
    println!("  storage:     {}", base.storage_target);
    println!("  bridge:      {}", base.network_bridge);
    println!("  guest-agent: {}", on_off(base.enable_guest_agent));
    println!("  root-ssh:    {}", on_off(base.enable_root_ssh));
}

fn print_summary(batch_report: &BatchReport) {
    println!(
        "Templates: {} (next VM id: {})",
        batch_report.templates.len(),
        batch_report.next_free_vm_id
    );
    for row in &batch_report.templates {
        let mut extras = Vec::new();
        if row.enable_guest_agent {
            extras.push("agent");
        }
        if row.enable_root_ssh {
            extras.push("root-ssh");
        }
        println!(
            "  {:<7} {:<24} {:<20} {}/{} {}",
            row.vm_id.to_string(),
            row.os_id.as_str(),
            row.label.as_deref().unwrap_or("(unsupported)"),
            row.storage_target,
            row.network_bridge,
            extras.join(",")
        );
    }
    if !batch_report.pending.is_empty() {
        println!("  Selected without template: {}", join_ids(&batch_report.pending));
    }
    warn_duplicates(batch_report);
    if batch_report.persistence_degraded {
        println!("⚠️  Batch state could not be saved; changes last for this run only");
    }
}

fn warn_duplicates(batch_report: &BatchReport) {
    if batch_report.duplicate_vm_ids.is_empty() {
        return;
    }
    let ids: Vec<String> = batch_report.duplicate_vm_ids.iter().map(ToString::to_string).collect();
    println!(
        "⚠️  Duplicate VM ids: {} (run `pveqc batch set vm-id <ID>` to renumber)",
        ids.join(", ")
    );
}
