//! Resolution backends consulted on cache misses and refresh sweeps.

use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;

use hickory_resolver::config::{
    LookupIpStrategy, NameServerConfig, ResolveHosts, ResolverConfig, ResolverOpts,
};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::{Resolver, TokioResolver};

use crate::config::{DnsConfig, IpStrategy};
use crate::error::{BoxError, DnsCacheError, Result};

/// A name resolution service sitting behind the cache.
///
/// Implementations must be idempotent: the cache may issue the same query
/// several times when misses race, and re-issues it on every refresh sweep.
pub trait HostResolver: Send + Sync {
    /// Resolve `host` to a list of literal addresses.
    fn lookup_host(
        &self,
        host: &str,
    ) -> impl Future<Output = std::result::Result<Vec<String>, BoxError>> + Send;

    /// Resolve a literal address to the names pointing at it.
    ///
    /// Backends without reverse lookup support keep the default, which
    /// always fails.
    fn lookup_addr(
        &self,
        addr: &str,
    ) -> impl Future<Output = std::result::Result<Vec<String>, BoxError>> + Send {
        let err = format!("reverse lookup of {addr} is not supported");
        std::future::ready(Err::<Vec<String>, BoxError>(err.into()))
    }
}

impl<T: HostResolver> HostResolver for Arc<T> {
    fn lookup_host(
        &self,
        host: &str,
    ) -> impl Future<Output = std::result::Result<Vec<String>, BoxError>> + Send {
        (**self).lookup_host(host)
    }

    fn lookup_addr(
        &self,
        addr: &str,
    ) -> impl Future<Output = std::result::Result<Vec<String>, BoxError>> + Send {
        (**self).lookup_addr(addr)
    }
}

/// Backend that resolves through hickory using system or custom nameservers.
#[derive(Clone)]
pub struct SystemResolver {
    resolver: TokioResolver,
}

impl SystemResolver {
    /// Create a backend with the given configuration.
    pub fn new(config: DnsConfig) -> Result<Self> {
        let (resolver_config, resolver_opts) = build_resolver_config(&config)?;

        let resolver =
            Resolver::builder_with_config(resolver_config, TokioConnectionProvider::default())
                .with_options(resolver_opts)
                .build();

        Ok(Self { resolver })
    }

    /// Create a backend using system DNS settings.
    ///
    /// On Unix, this reads `/etc/resolv.conf`.
    /// On Windows, this uses the system's configured DNS servers.
    pub fn system() -> Result<Self> {
        Self::new(DnsConfig::system())
    }

    /// Create a backend using Google's public DNS servers.
    pub fn google() -> Result<Self> {
        Self::new(DnsConfig::google())
    }

    /// Create a backend using Cloudflare's public DNS servers.
    pub fn cloudflare() -> Result<Self> {
        Self::new(DnsConfig::cloudflare())
    }
}

impl std::fmt::Debug for SystemResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemResolver").finish_non_exhaustive()
    }
}

impl HostResolver for SystemResolver {
    async fn lookup_host(&self, host: &str) -> std::result::Result<Vec<String>, BoxError> {
        let response = self.resolver.lookup_ip(host).await?;
        Ok(response.iter().map(|ip| ip.to_string()).collect())
    }

    async fn lookup_addr(&self, addr: &str) -> std::result::Result<Vec<String>, BoxError> {
        let ip: IpAddr = addr.parse()?;
        let response = self.resolver.reverse_lookup(ip).await?;
        Ok(response.iter().map(|ptr| ptr.0.to_string()).collect())
    }
}

/// Build hickory resolver configuration from our DnsConfig.
fn build_resolver_config(config: &DnsConfig) -> Result<(ResolverConfig, ResolverOpts)> {
    let resolver_config = if config.use_system_config {
        ResolverConfig::default()
    } else if config.nameservers.is_empty() {
        return Err(DnsCacheError::Configuration(
            "no nameservers configured".to_string(),
        ));
    } else {
        let mut resolver_config = ResolverConfig::new();
        for addr in &config.nameservers {
            resolver_config.add_name_server(NameServerConfig::new(*addr, Protocol::Udp));
            resolver_config.add_name_server(NameServerConfig::new(*addr, Protocol::Tcp));
        }
        resolver_config
    };

    let mut opts = ResolverOpts::default();
    opts.cache_size = config.cache_size;
    opts.use_hosts_file = if config.use_hosts_file {
        ResolveHosts::Auto
    } else {
        ResolveHosts::Never
    };
    opts.attempts = config.attempts;
    opts.timeout = config.timeout;
    opts.ip_strategy = match config.ip_strategy {
        IpStrategy::Ipv4Only => LookupIpStrategy::Ipv4Only,
        IpStrategy::Ipv6Only => LookupIpStrategy::Ipv6Only,
        IpStrategy::Ipv4ThenIpv6 => LookupIpStrategy::Ipv4thenIpv6,
        IpStrategy::Ipv6ThenIpv4 => LookupIpStrategy::Ipv6thenIpv4,
        IpStrategy::Ipv4AndIpv6 => LookupIpStrategy::Ipv4AndIpv6,
    };

    Ok((resolver_config, opts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_nameservers_rejected() {
        let result = build_resolver_config(&DnsConfig::with_nameservers(Vec::new()));
        assert!(matches!(result, Err(DnsCacheError::Configuration(_))));
    }

    #[test]
    fn test_custom_nameservers_use_udp_and_tcp() {
        let (config, opts) = build_resolver_config(&DnsConfig::google().attempts(4)).unwrap();
        assert_eq!(config.name_servers().len(), 4);
        assert_eq!(opts.attempts, 4);
    }
}
