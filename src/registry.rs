//! # Source Registry
//!
//! Maps a shipment context (origin port, carrier) to the external sources worth
//! scouting for it.
//!
//! - Loads from a TOML file (`ports` and `carriers` tables).
//! - Exact key match first, then a case-insensitive, whitespace-collapsed match.
//! - Unknown keys contribute nothing; the caller decides what "no sources" means.
//! - Includes a built-in `default_seed()` with the high-traffic nodes.
//!
//! The registry is immutable once built and is shared behind an `Arc`.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_REGISTRY_PATH: &str = "SOURCE_REGISTRY_PATH";
pub const DEFAULT_REGISTRY_PATH: &str = "config/sources.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    PortAuthority,
    CongestionData,
    CarrierAdvisory,
    #[serde(other)]
    Other,
}

/// One external information endpoint. Identity is `(name, url)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
}

impl Source {
    pub fn new(name: impl Into<String>, url: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceRegistry {
    #[serde(default)]
    ports: BTreeMap<String, Vec<Source>>,
    #[serde(default)]
    carriers: BTreeMap<String, Vec<Source>>,
}

impl SourceRegistry {
    pub fn new(
        ports: BTreeMap<String, Vec<Source>>,
        carriers: BTreeMap<String, Vec<Source>>,
    ) -> Self {
        Self { ports, carriers }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let reg: SourceRegistry = toml::from_str(s).context("parsing source registry toml")?;
        Ok(reg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading source registry from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallbacks:
    /// 1) $SOURCE_REGISTRY_PATH (must exist)
    /// 2) config/sources.toml
    /// 3) built-in seed
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_REGISTRY_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_REGISTRY_PATH} points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        let default = PathBuf::from(DEFAULT_REGISTRY_PATH);
        if default.exists() {
            return Self::load_from(&default);
        }
        Ok(Self::default_seed())
    }

    /// Port sources first, then carrier sources.
    pub fn resolve(&self, origin_port: &str, carrier: &str) -> Vec<Source> {
        let mut out = Vec::new();
        if let Some(v) = lookup(&self.ports, origin_port) {
            out.extend(v.iter().cloned());
        }
        if let Some(v) = lookup(&self.carriers, carrier) {
            out.extend(v.iter().cloned());
        }
        out
    }

    pub fn supported_origins(&self) -> Vec<String> {
        self.ports.keys().cloned().collect()
    }

    pub fn supported_carriers(&self) -> Vec<String> {
        self.carriers.keys().cloned().collect()
    }

    pub fn source_count(&self) -> usize {
        self.ports.values().chain(self.carriers.values()).map(Vec::len).sum()
    }

    /// Built-in seed with the nodes covered out of the box.
    pub fn default_seed() -> Self {
        let mut ports = BTreeMap::new();
        let mut carriers = BTreeMap::new();

        ports.insert(
            "Port of Los Angeles".to_string(),
            vec![
                Source::new(
                    "Port of LA - Operations Updates",
                    "https://www.portoflosangeles.org",
                    SourceKind::PortAuthority,
                ),
                Source::new(
                    "MarineTraffic - Port Congestion (LA)",
                    "https://www.marinetraffic.com/en/ais/details/ports/154/USA_port:LOS%20ANGELES",
                    SourceKind::CongestionData,
                ),
            ],
        );
        ports.insert(
            "Shanghai".to_string(),
            vec![Source::new(
                "Shanghai International Port Group",
                "http://www.portshanghai.com.cn/en/",
                SourceKind::PortAuthority,
            )],
        );

        carriers.insert(
            "Maersk".to_string(),
            vec![Source::new(
                "Maersk Network Advisories",
                "https://www.maersk.com/news/advisories",
                SourceKind::CarrierAdvisory,
            )],
        );
        carriers.insert(
            "MSC".to_string(),
            vec![Source::new(
                "MSC Customer Advisories",
                "https://www.msc.com/en/newsroom/customer-advisories",
                SourceKind::CarrierAdvisory,
            )],
        );

        Self { ports, carriers }
    }
}

fn lookup<'a>(table: &'a BTreeMap<String, Vec<Source>>, key: &str) -> Option<&'a Vec<Source>> {
    if let Some(v) = table.get(key) {
        return Some(v);
    }
    let wanted = normalize(key);
    if wanted.is_empty() {
        return None;
    }
    table
        .iter()
        .find(|(k, _)| normalize(k) == wanted)
        .map(|(_, v)| v)
}

/// Lowercase and collapse whitespace.
fn normalize(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
