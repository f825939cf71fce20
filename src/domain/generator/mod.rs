//! Single-template command generator.
//!
//! Expands one `TemplateConfig` into the ordered shell steps that download an
//! image, customize it, build a VM around it and convert that VM into a
//! template. Generation is pure: the same config and catalog always yield the
//! same steps.

mod scripts;

use crate::domain::catalog::{CatalogLookup, OsCatalogEntry};
use crate::domain::command_step::{CommandStep, StepKind, join_steps};
use crate::domain::TemplateConfig;
use crate::ports::OsCatalog;

/// Generate the ordered steps for one template.
///
/// An OS missing from the catalog yields a single visible `Unsupported` step
/// instead of an error so the rest of a batch still renders.
pub fn generate<C: OsCatalog + ?Sized>(
    config: &TemplateConfig,
    catalog: &C,
) -> Vec<CommandStep> {
    match catalog.lookup(config.os_id.as_str()) {
        CatalogLookup::Found(entry) => generate_for_entry(config, entry),
        CatalogLookup::NotFound => vec![unsupported_step(config.os_id.as_str())],
    }
}

/// Generate the steps for one template and join them into a single line.
pub fn generate_line<C: OsCatalog + ?Sized>(config: &TemplateConfig, catalog: &C) -> String {
    join_steps(&generate(config, catalog))
}

/// Placeholder step rendered for an OS the catalog does not know.
pub fn unsupported_step(os_id: &str) -> CommandStep {
    CommandStep::new(
        StepKind::Unsupported,
        "Error",
        format!("# Error: Operating system type \"{}\" is not supported", os_id),
    )
}

fn generate_for_entry(config: &TemplateConfig, entry: &OsCatalogEntry) -> Vec<CommandStep> {
    let image = entry.id.as_str();
    let vm = config.vm_id;
    let storage = config.storage_target.as_str();
    let name = entry.id.template_name();
    let customizing = config.enable_guest_agent || config.enable_root_ssh;

    let mut steps =
        vec![CommandStep::new(StepKind::Download, "Download OS Image", entry.download_command())];

    if customizing {
        steps.push(CommandStep::new(
            StepKind::InstallTooling,
            "Install libguestfs-tools",
            scripts::INSTALL_TOOLING,
        ));

        if entry.network_link_fix {
            steps.push(CommandStep::new(
                StepKind::NetworkLinkFix,
                format!("Remove Persistent Network Rules ({})", entry.label),
                scripts::network_link_fix(image),
            ));
        }
    }

    if config.enable_guest_agent {
        steps.push(guest_agent_step(entry));
    }

    if config.enable_root_ssh {
        steps.push(CommandStep::new(
            StepKind::EnableRootSsh,
            "Configure Root SSH Access",
            scripts::root_ssh(image),
        ));
    }

    steps.extend([
        CommandStep::new(
            StepKind::CreateVm,
            "Create Virtual Machine",
            format!(
                "qm create {} --name {} --memory 2048 --cores 2 --cpu host --net0 virtio,bridge={}",
                vm, name, config.network_bridge
            ),
        ),
        CommandStep::new(
            StepKind::ImportDisk,
            "Import QCOW2 Disk",
            format!("qm importdisk {} {} {}", vm, image, storage),
        ),
        CommandStep::new(
            StepKind::AttachScsi,
            "Configure VirtIO SCSI",
            format!("qm set {vm} --scsihw virtio-scsi-pci --scsi0 {storage}:vm-{vm}-disk-0"),
        ),
        CommandStep::new(
            StepKind::ConfigureDisplay,
            "Configure Display",
            format!("qm set {} --vga virtio --serial0 socket", vm),
        ),
        CommandStep::new(
            StepKind::AttachCloudInit,
            "Enable Cloud-Init",
            format!("qm set {} --ide2 {}:cloudinit", vm, storage),
        ),
        CommandStep::new(
            StepKind::ConfigureCloudInitUser,
            "Configure Cloud-Init User",
            format!("qm set {} --ciuser root --citype nocloud", vm),
        ),
        CommandStep::new(
            StepKind::SetBootDisk,
            "Configure Boot Options",
            format!("qm set {} --boot c --bootdisk scsi0", vm),
        ),
    ]);

    if config.enable_guest_agent {
        steps.push(CommandStep::new(
            StepKind::EnableAgentFlag,
            "Enable QEMU Guest Agent",
            format!("qm set {} --agent enabled=1", vm),
        ));
    }

    steps.push(CommandStep::new(
        StepKind::ConvertToTemplate,
        "Convert to Template",
        format!("qm template {}", vm),
    ));

    steps
}

fn guest_agent_step(entry: &OsCatalogEntry) -> CommandStep {
    let image = entry.id.as_str();
    if entry.needs_selinux_disable {
        CommandStep::new(
            StepKind::InstallGuestAgent,
            format!("Install & Enable QEMU Guest Agent ({})", entry.id.family_label()),
            scripts::guest_agent_selinux(image, entry.package_manager),
        )
    } else if entry.rhel_family {
        CommandStep::new(
            StepKind::InstallGuestAgent,
            format!("Install & Enable QEMU Guest Agent ({})", entry.id.family_label()),
            scripts::guest_agent_rhel(image, entry.package_manager),
        )
    } else {
        CommandStep::new(
            StepKind::InstallGuestAgent,
            "Install & Enable QEMU Guest Agent",
            scripts::guest_agent_generic(image),
        )
    }
}
