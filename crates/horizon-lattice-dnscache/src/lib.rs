//! Self-refreshing DNS cache for Horizon Lattice.
//!
//! This crate sits in front of a name resolution service and keeps its
//! answers in memory, so that callers issuing many connections (HTTP
//! clients, socket pools) do not pay the resolution cost on every dial and
//! keep working through short resolver outages.
//!
//! - **Cached lookups**: `host` and `host.` share one entry; hits never touch
//!   the backend
//! - **Refresh sweeps**: entries read since the last sweep are re-resolved,
//!   unread ones are evicted
//! - **Stale over unavailable**: a failed re-resolution keeps the previous
//!   answer
//! - **Pluggable backends**: anything implementing [`HostResolver`], with a
//!   hickory-based [`SystemResolver`] by default
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use horizon_lattice_dnscache::{LookupContext, RefreshConfig, Resolver};
//!
//! let resolver = Arc::new(Resolver::system()?);
//!
//! // Sweep every five minutes, evicting names nobody asked for since.
//! let refresher = resolver.spawn_refresher(RefreshConfig::new(Duration::from_secs(300)));
//!
//! let ctx = LookupContext::with_timeout(Duration::from_secs(2));
//! for addr in resolver.lookup_host(&ctx, "api.example.com").await? {
//!     println!("Resolved: {}", addr);
//! }
//!
//! refresher.shutdown().await;
//! ```
//!
//! # Custom Backends
//!
//! ```ignore
//! use horizon_lattice_dnscache::{BoxError, HostResolver, Resolver};
//!
//! struct Fixed;
//!
//! impl HostResolver for Fixed {
//!     async fn lookup_host(&self, _host: &str) -> Result<Vec<String>, BoxError> {
//!         Ok(vec!["203.0.113.5".to_string()])
//!     }
//! }
//!
//! let resolver = Resolver::builder(Fixed)
//!     .on_cache_miss(|| println!("miss"))
//!     .build();
//! ```

mod backend;
mod config;
mod context;
mod error;
mod refresher;
mod resolver;
pub mod store;

pub use backend::{HostResolver, SystemResolver};
pub use config::{DnsConfig, IpStrategy, RefreshConfig};
pub use context::LookupContext;
pub use error::{BoxError, DnsCacheError, Result};
pub use refresher::RefreshHandle;
pub use resolver::{MissHook, Resolver, ResolverBuilder};
pub use store::{CacheKey, CacheStore, EntrySnapshot};

pub use tokio_util::sync::CancellationToken;
