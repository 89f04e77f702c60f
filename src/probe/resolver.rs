//! Host name resolution.

use crate::utils::ResolveError;
use async_trait::async_trait;
use std::io;
use std::net::IpAddr;

/// Source of DNS answers
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Look up all addresses of `host`
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// Resolver backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl Resolver for SystemResolver {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Normalize `host` to a single dialable address string
///
/// A bracketed literal such as `[2001:db8::1]` is returned without its
/// brackets and is never looked up or validated. Anything else goes through
/// `resolver` and the first address returned wins.
pub async fn resolve(resolver: &dyn Resolver, host: &str) -> Result<String, ResolveError> {
    if let Some(literal) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
        return Ok(literal.to_string());
    }

    let addrs = resolver.lookup(host).await.map_err(|e| ResolveError::Lookup {
        host: host.to_string(),
        reason: e.to_string(),
    })?;

    addrs
        .first()
        .map(ToString::to_string)
        .ok_or_else(|| ResolveError::NoAddress {
            host: host.to_string(),
        })
}
