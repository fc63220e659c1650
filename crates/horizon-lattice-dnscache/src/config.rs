//! Configuration types for the resolution backend and the refresher.

use std::net::SocketAddr;
use std::time::Duration;

/// Configuration for the hickory-backed [`SystemResolver`](crate::SystemResolver).
#[derive(Debug, Clone)]
pub struct DnsConfig {
    /// Use system DNS configuration (reads /etc/resolv.conf on Unix).
    /// If false, uses custom nameservers.
    pub use_system_config: bool,

    /// Custom nameservers to use when `use_system_config` is false.
    pub nameservers: Vec<SocketAddr>,

    /// Size of hickory's internal record cache.
    ///
    /// The DNS cache keeps its own entries, so this only smooths bursts of
    /// identical queries issued by a refresh sweep.
    pub cache_size: usize,

    /// Whether to read from /etc/hosts file.
    pub use_hosts_file: bool,

    /// IP version preference for lookups.
    pub ip_strategy: IpStrategy,

    /// Number of retries for failed lookups.
    pub attempts: usize,

    /// Timeout for each DNS query attempt.
    pub timeout: Duration,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            use_system_config: true,
            nameservers: Vec::new(),
            cache_size: 32,
            use_hosts_file: true,
            ip_strategy: IpStrategy::default(),
            attempts: 2,
            timeout: Duration::from_secs(5),
        }
    }
}

impl DnsConfig {
    /// Create a new DNS configuration with system defaults.
    pub fn system() -> Self {
        Self::default()
    }

    /// Create a configuration with custom nameservers.
    pub fn with_nameservers(nameservers: Vec<SocketAddr>) -> Self {
        Self {
            use_system_config: false,
            nameservers,
            ..Default::default()
        }
    }

    /// Use Google's public DNS servers.
    pub fn google() -> Self {
        Self::with_nameservers(vec![
            SocketAddr::from(([8, 8, 8, 8], 53)),
            SocketAddr::from(([8, 8, 4, 4], 53)),
        ])
    }

    /// Use Cloudflare's public DNS servers.
    pub fn cloudflare() -> Self {
        Self::with_nameservers(vec![
            SocketAddr::from(([1, 1, 1, 1], 53)),
            SocketAddr::from(([1, 0, 0, 1], 53)),
        ])
    }

    /// Set the backend cache size.
    pub fn cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }

    /// Set whether to use the hosts file.
    pub fn use_hosts_file(mut self, use_hosts: bool) -> Self {
        self.use_hosts_file = use_hosts;
        self
    }

    /// Set the IP strategy.
    pub fn ip_strategy(mut self, strategy: IpStrategy) -> Self {
        self.ip_strategy = strategy;
        self
    }

    /// Set the number of retry attempts.
    pub fn attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    /// Set the timeout per attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// IP version lookup strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IpStrategy {
    /// Look up IPv4 addresses only.
    Ipv4Only,
    /// Look up IPv6 addresses only.
    Ipv6Only,
    /// Look up both IPv4 and IPv6, prefer IPv4.
    #[default]
    Ipv4ThenIpv6,
    /// Look up both IPv4 and IPv6, prefer IPv6.
    Ipv6ThenIpv4,
    /// Look up both IPv4 and IPv6 in parallel.
    Ipv4AndIpv6,
}

/// Configuration for the periodic refresh sweep.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Time between two sweeps.
    pub interval: Duration,
    /// Evict entries that were not read since the previous sweep.
    pub clear_unused: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5 * 60),
            clear_unused: true,
        }
    }
}

impl RefreshConfig {
    /// Create a refresh configuration with the given sweep interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Set the sweep interval.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set whether unused entries are evicted.
    pub fn clear_unused(mut self, clear: bool) -> Self {
        self.clear_unused = clear;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dns_config_builder() {
        let config = DnsConfig::cloudflare()
            .cache_size(0)
            .use_hosts_file(false)
            .ip_strategy(IpStrategy::Ipv6ThenIpv4)
            .attempts(3)
            .timeout(Duration::from_secs(1));

        assert!(!config.use_system_config);
        assert_eq!(config.nameservers.len(), 2);
        assert_eq!(config.cache_size, 0);
        assert!(!config.use_hosts_file);
        assert_eq!(config.ip_strategy, IpStrategy::Ipv6ThenIpv4);
        assert_eq!(config.attempts, 3);
        assert_eq!(config.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_presets() {
        assert!(DnsConfig::system().use_system_config);
        assert_eq!(
            DnsConfig::google().nameservers[0],
            "8.8.8.8:53".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_refresh_config() {
        let config = RefreshConfig::default();
        assert_eq!(config.interval, Duration::from_secs(300));
        assert!(config.clear_unused);

        let config = RefreshConfig::new(Duration::from_secs(30)).clear_unused(false);
        assert_eq!(config.interval, Duration::from_secs(30));
        assert!(!config.clear_unused);
    }
}
