//! Fixed shell fragments used by the template generator.

use crate::domain::catalog::PackageManager;

pub const INSTALL_TOOLING: &str = "apt update && apt install -y libguestfs-tools";

pub fn network_link_fix(image: &str) -> String {
    format!(
        "virt-customize -a {} --run-command 'ln -s /dev/null /etc/systemd/network/99-default.link'",
        image
    )
}

pub fn guest_agent_selinux(image: &str, package_manager: PackageManager) -> String {
    format!(
        "virt-customize -a {image} --run-command '#!/bin/bash
set -e
sed -i 's/^SELINUX=.*/SELINUX=disabled/' /etc/selinux/config
{package_manager} install -y qemu-guest-agent
systemctl enable qemu-guest-agent.service'"
    )
}

pub fn guest_agent_rhel(image: &str, package_manager: PackageManager) -> String {
    format!(
        "virt-customize -a {image} --run-command '#!/bin/bash
set -e
{package_manager} install -y qemu-guest-agent
systemctl enable qemu-guest-agent.service'"
    )
}

pub fn guest_agent_generic(image: &str) -> String {
    format!("virt-customize -a {} --install qemu-guest-agent", image)
}

const ROOT_SSH_SCRIPT: &str = r#"#!/bin/bash
set -e
mkdir -p /etc/cloud/cloud.cfg.d
cat > /etc/cloud/cloud.cfg.d/99-enable-root.cfg << "EOF"
disable_root: false
ssh_pwauth: true
ssh_deletekeys: false
EOF
mkdir -p /etc/ssh/sshd_config.d
cat > /etc/ssh/sshd_config.d/99-enable-root.conf << "EOF"
PermitRootLogin yes
PasswordAuthentication yes
EOF
if command -v semanage >/dev/null 2>&1 && command -v getenforce >/dev/null 2>&1; then
  if [ "$(getenforce)" != "Disabled" ]; then
    semanage boolean -m --on ssh_enable_root_login || true
  fi
fi
if command -v systemctl >/dev/null 2>&1; then
  systemctl restart sshd.service || systemctl restart ssh.service
else
  service sshd restart || service ssh restart
fi"#;

pub fn root_ssh(image: &str) -> String {
    format!("virt-customize -a {} --run-command '{}'", image, ROOT_SSH_SCRIPT)
}
