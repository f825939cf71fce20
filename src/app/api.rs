//! API Facade for the application.
//!
//! High-level functions that wire the filesystem store and the embedded
//! catalog into the command handlers. Every function has an `_at` form taking
//! an explicit state directory.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::adapters::{EmbeddedOsCatalog, FilesystemStateStore, STATE_DIR};
use crate::app::AppContext;
use crate::app::commands::{batch, export, generate};
use crate::app::config::AppConfig;
use crate::domain::{
    CloneConfig, CloneRequest, CloudConfig, FirewallRuleSet, OsCatalogEntry, OsGroup,
};
use crate::ports::OsCatalog;
use crate::services::BatchSession;

pub use crate::app::commands::batch::{BatchAction, BatchOutcome, BatchReport, TemplateRow};
pub use crate::app::commands::export::CopyOutcome;
pub use crate::app::commands::generate::{GenerateOptions, GenerateOutput};
pub use crate::domain::AppError;

pub type FilesystemSession = BatchSession<FilesystemStateStore, EmbeddedOsCatalog>;

/// Default state directory under the current directory.
pub fn default_state_dir() -> Result<PathBuf, AppError> {
    Ok(std::env::current_dir()?.join(STATE_DIR))
}

/// Create an `AppContext` for a state directory.
pub fn create_context(
    state_dir: impl Into<PathBuf>,
) -> Result<AppContext<FilesystemStateStore, EmbeddedOsCatalog>, AppError> {
    let config = AppConfig::load(state_dir.into())?;
    let store = FilesystemStateStore::new(config.state_dir.clone());
    let catalog = EmbeddedOsCatalog::new()?;
    Ok(AppContext::new(store, catalog, config))
}

/// Generate the steps for one template using the current directory's defaults.
pub fn generate(options: &GenerateOptions) -> Result<GenerateOutput, AppError> {
    generate_at(default_state_dir()?, options)
}

/// Generate the steps for one template using defaults from `state_dir`.
pub fn generate_at(
    state_dir: impl Into<PathBuf>,
    options: &GenerateOptions,
) -> Result<GenerateOutput, AppError> {
    let ctx = create_context(state_dir)?;
    generate::execute(ctx.catalog(), &ctx.config().defaults, options)
}

/// Validate a clone request and render its `qm clone` command.
pub fn clone_command(request: &CloneRequest) -> Result<String, AppError> {
    Ok(CloneConfig::from_request(request)?.command())
}

/// Cloud-init user data enabling password root login.
pub fn cloud_init_config() -> Result<String, AppError> {
    CloudConfig::root_login().render()
}

/// Default firewall rules with the rules for `disabled` ports switched off.
pub fn firewall_rules(disabled: &[String]) -> Result<FirewallRuleSet, AppError> {
    let mut rules = FirewallRuleSet::default();
    for port in disabled {
        rules.disable(port)?;
    }
    Ok(rules)
}

/// Catalog groups with their entries, in display order.
pub fn catalog_listing() -> Result<Vec<(OsGroup, Vec<OsCatalogEntry>)>, AppError> {
    let catalog = EmbeddedOsCatalog::new()?;
    Ok(catalog
        .groups()
        .iter()
        .map(|group| {
            let entries = group
                .os_ids
                .iter()
                .filter_map(|id| catalog.lookup(id.as_str()).found().cloned())
                .collect();
            (group.clone(), entries)
        })
        .collect())
}

/// Open the persisted batch in `state_dir`.
pub fn open_batch_at(state_dir: impl Into<PathBuf>) -> Result<FilesystemSession, AppError> {
    Ok(create_context(state_dir)?.into_session())
}

/// Apply one action to the batch in `state_dir` and report the result.
pub fn batch_at(
    state_dir: impl Into<PathBuf>,
    action: BatchAction,
) -> Result<(BatchOutcome, BatchReport), AppError> {
    let mut session = open_batch_at(state_dir)?;
    let outcome = batch::apply(&mut session, action)?;
    Ok((outcome, batch::report(&session)))
}

/// Report the batch in `state_dir` without changing it.
pub fn batch_report_at(state_dir: impl Into<PathBuf>) -> Result<BatchReport, AppError> {
    Ok(batch::report(&open_batch_at(state_dir)?))
}

/// Render the batch in `state_dir` as a shell script stamped with the current time.
pub fn batch_script_at(state_dir: impl Into<PathBuf>) -> Result<String, AppError> {
    let session = open_batch_at(state_dir)?;
    export::render_script(session.state().templates(), session.catalog(), Utc::now())
}

/// Render a single generated template as a shell script.
pub fn template_script(output: &GenerateOutput) -> Result<String, AppError> {
    let catalog = EmbeddedOsCatalog::new()?;
    export::render_script(std::slice::from_ref(&output.config), &catalog, Utc::now())
}

/// Write a rendered script to `path`.
pub fn write_script(path: &Path, script: &str) -> Result<(), AppError> {
    export::write_script(path, script)
}

/// Copy `text` to the system clipboard. Failure is reported, not raised.
pub fn copy_to_clipboard(text: &str) -> CopyOutcome {
    let mut clipboard = crate::adapters::ArboardClipboardWriter::new();
    export::copy_to_clipboard(&mut clipboard, text)
}
