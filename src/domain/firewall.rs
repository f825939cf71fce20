//! Cluster-wide firewall rule generator.

use std::fmt;

use crate::domain::AppError;

/// File the rendered rules are pasted into on a Proxmox VE node.
pub const CLUSTER_FIREWALL_PATH: &str = "/etc/pve/firewall/cluster.fw";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One inbound accept rule. `port` is a single port or a `first:last` range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallRule {
    pub port: String,
    pub protocol: Protocol,
    pub description: String,
    pub enabled: bool,
}

impl FirewallRule {
    fn new(port: &str, protocol: Protocol, description: &str) -> Self {
        Self {
            port: port.to_string(),
            protocol,
            description: description.to_string(),
            enabled: true,
        }
    }

    /// `IN ACCEPT -p <proto> --dport <port>`
    pub fn line(&self) -> String {
        format!("IN ACCEPT -p {} --dport {}", self.protocol, self.port)
    }
}

/// The rules a node needs for SSH, the web UI, consoles and clustering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallRuleSet {
    rules: Vec<FirewallRule>,
}

impl Default for FirewallRuleSet {
    fn default() -> Self {
        Self {
            rules: vec![
                FirewallRule::new("22", Protocol::Tcp, "Allow SSH"),
                FirewallRule::new("8006", Protocol::Tcp, "Allow PVE Web UI"),
                FirewallRule::new("443", Protocol::Tcp, "Allow HTTPS (API)"),
                FirewallRule::new("80", Protocol::Tcp, "Allow HTTP (Certificate Management)"),
                FirewallRule::new("5900:5999", Protocol::Tcp, "Allow VNC Access"),
                FirewallRule::new(
                    "5404:5405",
                    Protocol::Udp,
                    "Allow Proxmox Cluster Communication",
                ),
                FirewallRule::new("3128", Protocol::Tcp, "Allow Proxmox Proxy Port"),
                FirewallRule::new("60000", Protocol::Tcp, "Allow Proxmox Remote Access"),
            ],
        }
    }
}

impl FirewallRuleSet {
    pub fn rules(&self) -> &[FirewallRule] {
        &self.rules
    }

    pub fn enabled(&self) -> impl Iterator<Item = &FirewallRule> {
        self.rules.iter().filter(|rule| rule.enabled)
    }

    /// Flip the rule for `port`. Returns the new enabled state.
    pub fn toggle(&mut self, port: &str) -> Result<bool, AppError> {
        let rule = self.rule_mut(port)?;
        rule.enabled = !rule.enabled;
        Ok(rule.enabled)
    }

    /// Turn the rule for `port` off. Disabling twice is not an error.
    pub fn disable(&mut self, port: &str) -> Result<(), AppError> {
        self.rule_mut(port)?.enabled = false;
        Ok(())
    }

    /// `[RULES]` section with one line per enabled rule, in table order.
    pub fn render(&self) -> String {
        let mut config = String::from("[RULES]\n");
        for rule in self.enabled() {
            config.push_str(&rule.line());
            config.push('\n');
        }
        config
    }

    fn rule_mut(&mut self, port: &str) -> Result<&mut FirewallRule, AppError> {
        // Accept `5900-5999` for the `5900:5999` range.
        let wanted = port.trim().replace('-', ":");
        let available =
            self.rules.iter().map(|rule| rule.port.as_str()).collect::<Vec<_>>().join(", ");
        self.rules
            .iter_mut()
            .find(|rule| rule.port == wanted)
            .ok_or_else(|| AppError::UnknownFirewallRule { port: port.to_string(), available })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_render_in_order() {
        let rendered = FirewallRuleSet::default().render();
        assert_eq!(
            rendered,
            "[RULES]\n\
             IN ACCEPT -p tcp --dport 22\n\
             IN ACCEPT -p tcp --dport 8006\n\
             IN ACCEPT -p tcp --dport 443\n\
             IN ACCEPT -p tcp --dport 80\n\
             IN ACCEPT -p tcp --dport 5900:5999\n\
             IN ACCEPT -p udp --dport 5404:5405\n\
             IN ACCEPT -p tcp --dport 3128\n\
             IN ACCEPT -p tcp --dport 60000\n"
        );
    }

    #[test]
    fn disabled_rules_are_left_out() {
        let mut rules = FirewallRuleSet::default();
        rules.disable("80").unwrap();
        rules.disable("5404-5405").unwrap();

        let rendered = rules.render();
        assert!(!rendered.contains("--dport 80\n"));
        assert!(!rendered.contains("5404:5405"));
        assert_eq!(rules.enabled().count(), 6);
    }

    #[test]
    fn toggle_flips_state() {
        let mut rules = FirewallRuleSet::default();
        assert!(!rules.toggle("22").unwrap());
        assert!(rules.toggle("22").unwrap());
        assert!(rules.render().contains("--dport 22\n"));
    }

    #[test]
    fn all_disabled_leaves_header_only() {
        let mut rules = FirewallRuleSet::default();
        let ports: Vec<String> = rules.rules().iter().map(|r| r.port.clone()).collect();
        for port in &ports {
            rules.disable(port).unwrap();
        }
        assert_eq!(rules.render(), "[RULES]\n");
    }

    #[test]
    fn unknown_port_lists_available_rules() {
        let mut rules = FirewallRuleSet::default();
        let err = rules.disable("25").unwrap_err();
        assert!(matches!(err, AppError::UnknownFirewallRule { .. }));
        assert!(err.to_string().contains("8006"));
        assert_eq!(rules, FirewallRuleSet::default());
    }
}
