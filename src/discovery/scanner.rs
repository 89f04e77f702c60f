//! Extraction of peer URIs from a region/country directory tree.

use crate::peer::{Peer, Protocol};
use crate::utils::{CheckerError, DiscoveryConfig, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    /// Matches `scheme://host:port` for every supported transport.
    ///
    /// The host may be a bracketed IPv6 literal, an IPv4 literal or a DNS name.
    pub static ref PEER_PATTERN: Regex =
        Regex::new(r"(tcp|tls|quic)://([a-z0-9\.\-:\[\]]+):([0-9]+)").expect("peer pattern compiles");
}

/// Extract every peer URI from a country file's contents, in source order
pub fn parse_peers(content: &str, region: &str, country: &str) -> Vec<Peer> {
    PEER_PATTERN
        .captures_iter(content)
        .filter_map(|caps| {
            let uri = &caps[0];
            let port = match caps[3].parse::<u16>() {
                Ok(port) => port,
                Err(e) => {
                    log::debug!("Skipping {} in {}/{}: bad port ({})", uri, region, country, e);
                    return None;
                }
            };
            let protocol = caps[1].parse::<Protocol>().unwrap_or_else(|never| match never {});
            Some(Peer::new(uri, protocol, &caps[2], port, region, country))
        })
        .collect()
}

/// Scan the peer list rooted at `root`
///
/// Regions and countries are visited in name order, so the result is
/// deterministic for a given tree.
///
/// # Errors
///
/// Returns [`CheckerError::DirectoryRead`] if `root`, a region directory or a
/// country file cannot be read.
pub fn scan_peers(root: &Path, config: &DiscoveryConfig) -> Result<Vec<Peer>> {
    let mut peers = Vec::new();

    for region in list_regions(root, config)? {
        let region_dir = root.join(&region);
        for country in list_countries(&region_dir, config)? {
            let path = region_dir.join(&country);
            let content =
                std::fs::read_to_string(&path).map_err(|e| CheckerError::directory_read(&path, &e))?;
            let found = parse_peers(&content, &region, &country);
            log::debug!("{}/{}: {} peers", region, country, found.len());
            peers.extend(found);
        }
    }

    log::info!("Found {} peers under {}", peers.len(), root.display());
    Ok(peers)
}

fn list_regions(root: &Path, config: &DiscoveryConfig) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(root).map_err(|e| CheckerError::directory_read(root, &e))?;

    let mut regions = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CheckerError::directory_read(root, &e))?;
        let is_dir = entry
            .file_type()
            .map_err(|e| CheckerError::directory_read(&entry.path(), &e))?
            .is_dir();
        let name = entry.file_name().to_string_lossy().into_owned();

        if !is_dir || config.excluded_dirs.contains(&name) {
            continue;
        }
        if !config.regions.is_empty() && !config.regions.contains(&name) {
            continue;
        }
        regions.push(name);
    }

    regions.sort();
    Ok(regions)
}

fn list_countries(region_dir: &Path, config: &DiscoveryConfig) -> Result<Vec<String>> {
    let entries =
        std::fs::read_dir(region_dir).map_err(|e| CheckerError::directory_read(region_dir, &e))?;

    let mut countries = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CheckerError::directory_read(region_dir, &e))?;
        let name = entry.file_name().to_string_lossy().into_owned();

        if !name.ends_with(&config.file_suffix) || entry.path().is_dir() {
            continue;
        }
        if !config.countries.is_empty() && !config.countries.contains(&name) {
            continue;
        }
        countries.push(name);
    }

    countries.sort();
    Ok(countries)
}
