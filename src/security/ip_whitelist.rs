use anyhow::Result;
use ipnetwork::IpNetwork;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Hot-reloadable CIDR/IP allowlist for the ambient request-filtering layer
/// (spec §2.2 security ambient stack).
#[derive(Debug, Clone)]
pub struct IpWhitelist {
    allowed_networks: Arc<RwLock<Vec<IpNetwork>>>,
}

impl IpWhitelist {
    pub fn new(allowed_ips: Vec<String>) -> Result<Self> {
        let networks = Self::parse_ip_list(&allowed_ips)?;
        Ok(Self { allowed_networks: Arc::new(RwLock::new(networks)) })
    }

    /// An empty configured list allows every IP; this is the default for
    /// local development.
    fn parse_ip_list(ips: &[String]) -> Result<Vec<IpNetwork>> {
        let mut networks = Vec::new();

        for ip_str in ips {
            let ip_str = ip_str.trim();

            match ip_str.parse::<IpNetwork>() {
                Ok(network) => {
                    networks.push(network);
                    debug!(%network, "allowlist entry added");
                }
                Err(_) => {
                    if let Ok(ip) = ip_str.parse::<IpAddr>() {
                        let network = match ip {
                            IpAddr::V4(ipv4) => {
                                IpNetwork::V4(ipnetwork::Ipv4Network::new(ipv4, 32)?)
                            }
                            IpAddr::V6(ipv6) => {
                                IpNetwork::V6(ipnetwork::Ipv6Network::new(ipv6, 128)?)
                            }
                        };
                        networks.push(network);
                        debug!(%ip, "allowlist single IP added");
                    } else {
                        warn!(entry = %ip_str, "invalid IP/CIDR format, skipping");
                    }
                }
            }
        }

        Ok(networks)
    }

    pub async fn is_allowed(&self, ip: IpAddr) -> bool {
        let networks = self.allowed_networks.read().await;
        if networks.is_empty() {
            return true;
        }
        for network in networks.iter() {
            if network.contains(ip) {
                return true;
            }
        }
        warn!(%ip, "IP not in allowlist");
        false
    }

    pub async fn reload(&self, new_ips: Vec<String>) -> Result<()> {
        let networks = Self::parse_ip_list(&new_ips)?;
        let mut allowed = self.allowed_networks.write().await;
        *allowed = networks;
        info!(count = allowed.len(), "IP allowlist reloaded");
        Ok(())
    }

    pub async fn get_whitelist(&self) -> Vec<String> {
        let networks = self.allowed_networks.read().await;
        networks.iter().map(|n| n.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_list_allows_everything() {
        let wl = IpWhitelist::new(vec![]).unwrap();
        assert!(wl.is_allowed("203.0.113.5".parse().unwrap()).await);
    }

    #[tokio::test]
    async fn cidr_match() {
        let wl = IpWhitelist::new(vec!["10.0.0.0/8".to_string()]).unwrap();
        assert!(wl.is_allowed("10.1.2.3".parse().unwrap()).await);
        assert!(!wl.is_allowed("192.168.1.1".parse().unwrap()).await);
    }

    #[tokio::test]
    async fn single_ip_match() {
        let wl = IpWhitelist::new(vec!["203.0.113.9".to_string()]).unwrap();
        assert!(wl.is_allowed("203.0.113.9".parse().unwrap()).await);
        assert!(!wl.is_allowed("203.0.113.10".parse().unwrap()).await);
    }

    #[tokio::test]
    async fn reload_replaces_entries() {
        let wl = IpWhitelist::new(vec!["10.0.0.0/8".to_string()]).unwrap();
        wl.reload(vec!["192.168.0.0/16".to_string()]).await.unwrap();
        assert!(!wl.is_allowed("10.1.2.3".parse().unwrap()).await);
        assert!(wl.is_allowed("192.168.5.5".parse().unwrap()).await);
    }
}
