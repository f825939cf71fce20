mod common;

use common::TestContext;
use predicates::prelude::*;
use std::fs;

#[test]
fn toggles_assign_sequential_vm_ids_and_persist() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(["batch", "toggle", "ubuntu-22.04", "rocky-9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ Selected ubuntu-22.04.qcow2"))
        .stdout(predicate::str::contains("✅ Selected rocky-9.qcow2"))
        .stdout(predicate::str::contains("Templates: 2 (next VM id: 9002)"));

    for key in ["baseConfig", "selection", "templates"] {
        assert!(ctx.state_file(key).exists(), "{}.json should be written", key);
    }
    assert_eq!(ctx.vm_ids(), vec![9000, 9001]);
    assert_eq!(ctx.os_ids(), vec!["ubuntu-22.04.qcow2", "rocky-9.qcow2"]);
}

#[test]
fn toggling_again_removes_template() {
    let ctx = TestContext::new();
    ctx.batch(&["toggle", "ubuntu-22.04", "debian-12"]);

    ctx.cli()
        .args(["batch", "toggle", "ubuntu-22.04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ Deselected ubuntu-22.04.qcow2"));

    assert_eq!(ctx.os_ids(), vec!["debian-12.qcow2"]);
    let selection: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(ctx.state_file("selection")).unwrap()).unwrap();
    assert_eq!(selection, serde_json::json!({ "debian-12.qcow2": true }));
}

#[test]
fn group_toggle_selects_then_deselects() {
    let ctx = TestContext::new();
    ctx.batch(&["toggle", "ubuntu-24.04"]);

    ctx.batch(&["group", "rocky linux"]);
    assert_eq!(ctx.os_ids(), vec!["ubuntu-24.04.qcow2", "rocky-9.qcow2", "rocky-8.qcow2"]);
    assert_eq!(ctx.vm_ids(), vec![9000, 9001, 9002]);

    ctx.batch(&["group", "Rocky Linux"]);
    assert_eq!(ctx.os_ids(), vec!["ubuntu-24.04.qcow2"]);
}

#[test]
fn unknown_group_lists_available_groups() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(["batch", "group", "BSD"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OS group 'BSD' not found"))
        .stderr(predicate::str::contains("AlmaLinux"));
}

#[test]
fn select_all_then_clear_selection() {
    let ctx = TestContext::new();

    ctx.batch(&["select-all"]);
    let vm_ids = ctx.vm_ids();
    assert_eq!(vm_ids.len(), 12);
    assert_eq!(vm_ids, (9000..9012).collect::<Vec<u64>>());

    ctx.batch(&["clear-selection"]);
    assert!(ctx.vm_ids().is_empty());
    assert_eq!(ctx.report()["pending"], serde_json::json!([]));
}

#[test]
fn changing_vm_id_renumbers_templates() {
    let ctx = TestContext::new();
    ctx.batch(&["toggle", "debian-12", "debian-11", "fedora-41"]);

    ctx.cli()
        .args(["batch", "set", "vm-id", "9100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ Updated vm-id"));

    assert_eq!(ctx.vm_ids(), vec![9100, 9101, 9102]);
}

#[test]
fn rejected_edit_keeps_previous_value() {
    let ctx = TestContext::new();
    ctx.batch(&["toggle", "debian-12"]);

    ctx.cli()
        .args(["batch", "set", "vm-id", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value 'abc' for vm-id"));

    ctx.cli()
        .args(["batch", "set", "memory", "4096"])
        .assert()
        .failure();

    assert_eq!(ctx.report()["base"]["vmId"], 9000);
    assert_eq!(ctx.vm_ids(), vec![9000]);
}

#[test]
fn disabling_agent_clears_root_ssh() {
    let ctx = TestContext::new();
    ctx.batch(&["set", "root-ssh", "on"]);
    assert_eq!(ctx.report()["base"]["enableRootSsh"], true);

    ctx.batch(&["set", "guest-agent", "off"]);
    let base = ctx.report()["base"].clone();
    assert_eq!(base["enableGuestAgent"], false);
    assert_eq!(base["enableRootSsh"], false);

    ctx.cli()
        .args(["batch", "set", "root-ssh", "on"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires the QEMU guest agent"));
}

#[test]
fn export_prints_merged_command() {
    let ctx = TestContext::new();
    ctx.batch(&["set", "guest-agent", "off"]);
    ctx.batch(&["toggle", "debian-12", "ubuntu-22.04"]);

    let output = ctx.cli().args(["batch", "export"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let line = stdout.trim_end();

    assert!(line.starts_with("wget https://cloud.debian.org/"));
    assert!(line.contains("qm template 9000 && wget https://cloud-images.ubuntu.com/jammy/"));
    assert!(line.ends_with("qm template 9001"));
    assert_eq!(line.lines().count(), 1);
}

#[test]
fn export_writes_script_file() {
    let ctx = TestContext::new();
    ctx.batch(&["toggle", "almalinux-9", "centos-stream-9"]);

    ctx.cli()
        .args(["batch", "export", "--output", "templates.sh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ Wrote 2 template(s) to templates.sh"));

    let script = fs::read_to_string(ctx.work_dir().join("templates.sh")).unwrap();
    assert!(script.contains("# Templates: 2"));
    assert!(script.contains("# === AlmaLinux 9: VM 9000 (almalinux-9-template) ==="));
    assert!(script.contains("# === CentOS Stream 9: VM 9001 (centos-stream-9-template) ==="));
    assert!(script.contains("dnf install -y qemu-guest-agent"));
}

#[test]
fn export_of_empty_batch_is_a_warning() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(["batch", "export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to export"));
}

#[test]
fn clear_keeps_selection() {
    let ctx = TestContext::new();
    ctx.batch(&["toggle", "debian-12"]);

    ctx.cli()
        .args(["batch", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared template list (selection kept)"))
        .stdout(predicate::str::contains("Selected without template: debian-12.qcow2"));

    let report = ctx.report();
    assert_eq!(report["templates"], serde_json::json!([]));
    assert_eq!(report["pending"], serde_json::json!(["debian-12.qcow2"]));
    assert_eq!(report["mergedCommand"], "");
}

#[test]
fn reset_removes_persisted_state() {
    let ctx = TestContext::new();
    ctx.write_config("[defaults]\nvm_id = 6000\n");
    ctx.batch(&["set", "vm-id", "9100"]);
    ctx.batch(&["toggle", "debian-12"]);

    ctx.cli()
        .args(["batch", "reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ Reset batch to defaults"));

    for key in ["baseConfig", "selection", "templates"] {
        assert!(!ctx.state_file(key).exists(), "{}.json should be removed", key);
    }
    assert!(ctx.state_dir().join("config.toml").exists());
    assert_eq!(ctx.report()["base"]["vmId"], 6000);
}

#[test]
fn position_based_ids_can_collide_and_are_reported() {
    let ctx = TestContext::new();
    ctx.batch(&["toggle", "ubuntu-22.04", "debian-12", "debian-11"]);
    ctx.batch(&["toggle", "ubuntu-22.04"]);

    ctx.cli()
        .args(["batch", "toggle", "fedora-41"])
        .assert()
        .success()
        .stdout(predicate::str::contains("⚠️  Duplicate VM ids: 9002"));

    assert_eq!(ctx.vm_ids(), vec![9001, 9002, 9002]);
    assert_eq!(ctx.report()["duplicateVmIds"], serde_json::json!([9002]));
}

#[test]
fn corrupt_entry_recovers_independently() {
    let ctx = TestContext::new();
    ctx.batch(&["set", "storage", "ceph"]);
    ctx.batch(&["toggle", "debian-12"]);
    fs::write(ctx.state_file("templates"), "{ not json").unwrap();

    let report = ctx.report();
    assert_eq!(report["base"]["storageTarget"], "ceph");
    assert_eq!(report["templates"], serde_json::json!([]));
    assert_eq!(report["pending"], serde_json::json!(["debian-12.qcow2"]));
}

#[test]
fn show_lists_steps() {
    let ctx = TestContext::new();
    ctx.batch(&["toggle", "rocky-9"]);

    ctx.cli()
        .args(["batch", "show", "--steps"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Base configuration:"))
        .stdout(predicate::str::contains("== VM 9000 (rocky-9.qcow2) =="))
        .stdout(predicate::str::contains("# 1. Download OS Image"));
}

#[test]
fn vm_ids_past_maximum_are_rejected() {
    let ctx = TestContext::new();
    ctx.batch(&["select-all"]);

    ctx.cli()
        .args(["batch", "set", "vm-id", "999990"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("would end at 1000001"));
    assert_eq!(ctx.report()["base"]["vmId"], 9000);

    ctx.batch(&["clear-selection"]);
    ctx.batch(&["toggle", "debian-12"]);
    ctx.batch(&["set", "vm-id", "999999"]);

    ctx.cli()
        .args(["batch", "toggle", "rocky-9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot add 1 template(s) from VM id 1000000"));
    assert_eq!(ctx.vm_ids(), vec![999999]);
}

#[test]
fn invalid_persisted_template_is_discarded() {
    let ctx = TestContext::new();
    ctx.batch(&["set", "root-ssh", "on"]);
    ctx.batch(&["toggle", "rocky-9", "debian-12"]);

    let path = ctx.state_file("templates");
    let mut templates: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    templates[0]["enableGuestAgent"] = serde_json::json!(false);
    templates[0]["storageTarget"] = serde_json::json!("");
    fs::write(&path, serde_json::to_string(&templates).unwrap()).unwrap();

    let report = ctx.report();
    assert_eq!(ctx.os_ids(), vec!["debian-12.qcow2"]);
    assert_eq!(report["pending"], serde_json::json!(["rocky-9.qcow2"]));
    assert!(!report["mergedCommand"].as_str().unwrap().contains("rocky-9"));
}
