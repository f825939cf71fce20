//! CLI Adapter.

mod batch;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dialoguer::Select;

use crate::app::api::{self, CopyOutcome, GenerateOptions, GenerateOutput};
use crate::app::config::STATE_DIR_ENV;
use crate::app::logging;
use crate::domain::firewall::CLUSTER_FIREWALL_PATH;
use crate::domain::template_config::parse_flag;
use crate::domain::{AppError, CloneRequest, CloneType};

#[derive(Parser)]
#[command(name = "pveqc")]
#[command(version)]
#[command(
    about = "Render Proxmox VE template provisioning jobs into copy-pasteable shell commands",
    long_about = None
)]
struct Cli {
    /// Directory holding the persisted batch and config.toml
    #[arg(long, global = true, env = STATE_DIR_ENV, value_name = "DIR")]
    state_dir: Option<PathBuf>,
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the commands for a single template
    #[clap(visible_alias = "g")]
    Generate {
        /// OS image id, e.g. rocky-9 or rocky-9.qcow2 (prompted when omitted)
        #[arg(long)]
        os: Option<String>,
        /// VM id of the template
        #[arg(long)]
        vm_id: Option<String>,
        /// Storage target for the imported disk
        #[arg(long)]
        storage: Option<String>,
        /// Network bridge of the first NIC
        #[arg(long)]
        bridge: Option<String>,
        /// Install the QEMU guest agent (on/off)
        #[arg(long, value_parser = parse_switch, value_name = "on|off")]
        guest_agent: Option<bool>,
        /// Enable root SSH login with password (on/off)
        #[arg(long, value_parser = parse_switch, value_name = "on|off")]
        root_ssh: Option<bool>,
        /// Print a single line joined with &&
        #[arg(long)]
        merged: bool,
        /// Copy the merged command to the clipboard
        #[arg(long)]
        copy: bool,
        /// Write a shell script to FILE
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Generate a qm clone command for a new VM from a template
    Clone {
        /// VM id of the source template
        template_id: String,
        /// Name of the new VM (letters, numbers, hyphens)
        name: String,
        /// Disk size in GB
        #[arg(long)]
        disk: Option<String>,
        /// Memory in MB (at least 512)
        #[arg(long)]
        memory: Option<String>,
        /// CPU cores (1-128)
        #[arg(long)]
        cores: Option<String>,
        /// Create a linked clone instead of a full copy
        #[arg(long)]
        linked: bool,
        /// Copy the command to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Print cloud-init user data enabling root password login
    #[clap(name = "cloud-init")]
    CloudInit {
        /// Write the document to FILE instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print cluster firewall rules for /etc/pve/firewall/cluster.fw
    Firewall {
        /// Leave out the rule for PORT (repeatable), e.g. 80 or 5900:5999
        #[arg(long, value_name = "PORT")]
        disable: Vec<String>,
        /// Show every rule with its description and state instead
        #[arg(long)]
        list: bool,
        /// Copy the rules to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// List supported OS images
    #[clap(visible_alias = "ls")]
    Catalog,
    /// Manage the persisted multi-OS batch
    #[clap(visible_alias = "b")]
    Batch {
        #[command(subcommand)]
        command: batch::BatchCommands,
    },
}

/// Entry point for the CLI.
pub fn run() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.state_dir {
        Some(dir) => Ok(dir),
        None => api::default_state_dir(),
    }
    .and_then(|state_dir| dispatch(cli.command, state_dir));

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn dispatch(command: Commands, state_dir: PathBuf) -> Result<(), AppError> {
    match command {
        Commands::Generate {
            os,
            vm_id,
            storage,
            bridge,
            guest_agent,
            root_ssh,
            merged,
            copy,
            output,
        } => {
            let Some(os) = resolve_os(os)? else {
                return Ok(());
            };
            let options = GenerateOptions { os, vm_id, storage, bridge, guest_agent, root_ssh };
            run_generate(state_dir, &options, merged, copy, output)
        }
        Commands::Clone { template_id, name, disk, memory, cores, linked, copy } => {
            let clone_type = if linked { CloneType::Linked } else { CloneType::Full };
            let request = CloneRequest {
                template_id,
                name,
                disk_gb: disk,
                memory_mb: memory,
                cores,
                clone_type,
            };
            run_clone(&request, copy)
        }
        Commands::CloudInit { output } => run_cloud_init(output),
        Commands::Firewall { disable, list, copy } => run_firewall(&disable, list, copy),
        Commands::Catalog => run_catalog(),
        Commands::Batch { command } => batch::run_batch(state_dir, command),
    }
}

fn parse_switch(raw: &str) -> Result<bool, String> {
    parse_flag("switch", raw).map_err(|e| e.to_string())
}

fn resolve_os(os: Option<String>) -> Result<Option<String>, AppError> {
    if let Some(os) = os {
        return Ok(Some(os));
    }
    if !(std::io::stdin().is_terminal() && std::io::stdout().is_terminal()) {
        return Err(AppError::config_error("--os is required when not running interactively"));
    }
    prompt_os()
}

fn prompt_os() -> Result<Option<String>, AppError> {
    let entries: Vec<_> =
        api::catalog_listing()?.into_iter().flat_map(|(_, entries)| entries).collect();
    let items: Vec<String> =
        entries.iter().map(|entry| format!("{} ({})", entry.label, entry.id)).collect();

    let selection = Select::new()
        .with_prompt("Select operating system")
        .items(&items)
        .default(0)
        .interact_opt()
        .map_err(|err| AppError::config_error(format!("Failed to select OS: {}", err)))?;

    Ok(selection.map(|index| entries[index].id.to_string()))
}

fn run_generate(
    state_dir: PathBuf,
    options: &GenerateOptions,
    merged: bool,
    copy: bool,
    output: Option<PathBuf>,
) -> Result<(), AppError> {
    let generated = api::generate_at(state_dir, options)?;

    if merged {
        println!("{}", generated.merged());
    } else {
        print_steps(&generated);
    }

    if let Some(path) = output {
        let script = api::template_script(&generated)?;
        api::write_script(&path, &script)?;
        println!("✅ Wrote script to {}", path.display());
    }
    if copy {
        report_copy(api::copy_to_clipboard(&generated.merged()));
    }
    Ok(())
}

fn print_steps(generated: &GenerateOutput) {
    for (index, step) in generated.steps.iter().enumerate() {
        println!("# {}. {}", index + 1, step.description);
        println!("{}", step.command);
    }
}

fn run_clone(request: &CloneRequest, copy: bool) -> Result<(), AppError> {
    let command = api::clone_command(request)?;
    println!("{}", command);
    if copy {
        report_copy(api::copy_to_clipboard(&command));
    }
    Ok(())
}

fn run_cloud_init(output: Option<PathBuf>) -> Result<(), AppError> {
    let document = api::cloud_init_config()?;
    match output {
        Some(path) => {
            std::fs::write(&path, &document)?;
            println!("✅ Wrote cloud-init config to {}", path.display());
        }
        None => print!("{}", document),
    }
    Ok(())
}

fn run_firewall(disabled: &[String], list: bool, copy: bool) -> Result<(), AppError> {
    let rules = api::firewall_rules(disabled)?;
    if list {
        for rule in rules.rules() {
            let state = if rule.enabled { "on" } else { "off" };
            println!("  {:<10} {:<4} {:<4} {}", rule.port, rule.protocol, state, rule.description);
        }
        return Ok(());
    }

    let config = rules.render();
    print!("{}", config);
    if copy {
        report_copy(api::copy_to_clipboard(&config));
        println!("Paste into {}", CLUSTER_FIREWALL_PATH);
    }
    Ok(())
}

fn run_catalog() -> Result<(), AppError> {
    for (group, entries) in api::catalog_listing()? {
        println!("{}", group.label);
        for entry in entries {
            let mut flags = vec![entry.package_manager.to_string()];
            if entry.rhel_family {
                flags.push("rhel".to_string());
            }
            if entry.needs_selinux_disable {
                flags.push("selinux-off".to_string());
            }
            if entry.network_link_fix {
                flags.push("link-fix".to_string());
            }
            println!("  {:<24} {:<20} {}", entry.id.as_str(), entry.label, flags.join(", "));
        }
    }
    Ok(())
}

fn report_copy(outcome: CopyOutcome) {
    match outcome {
        CopyOutcome::Copied => println!("✅ Copied to clipboard"),
        CopyOutcome::Unavailable(reason) => {
            println!("⚠️  Could not copy to clipboard: {}", reason)
        }
    }
}
