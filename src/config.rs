use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use tracing::warn;

use crate::page::DEFAULT_PLOTLY_SRC;

pub const DEFAULT_DATASET: &str = "Fifa_world_cup_matches.csv";
pub const DEFAULT_PAGE_OUT: &str = "fifa_world_cup_dashboard.html";
pub const DEFAULT_PORT: u16 = 8050;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub dataset: PathBuf,
    pub host: IpAddr,
    pub port: u16,
    pub page_out: PathBuf,
    pub plotly_src: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from(DEFAULT_DATASET),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            page_out: PathBuf::from(DEFAULT_PAGE_OUT),
            plotly_src: DEFAULT_PLOTLY_SRC.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Reads `.env.local` and `.env` (when present) and then the process
    /// environment.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(path) = get("WC_DATASET_PATH") {
            cfg.dataset = PathBuf::from(path);
        }
        if let Some(raw) = get("WC_DASHBOARD_HOST") {
            match raw.parse::<IpAddr>() {
                Ok(host) => cfg.host = host,
                Err(_) => warn!("ignoring WC_DASHBOARD_HOST={raw:?}: not an IP address"),
            }
        }
        if let Some(raw) = get("WC_DASHBOARD_PORT") {
            match raw.parse::<u16>() {
                Ok(port) if port != 0 => cfg.port = port,
                _ => warn!("ignoring WC_DASHBOARD_PORT={raw:?}, using {DEFAULT_PORT}"),
            }
        }
        if let Some(path) = get("WC_DASHBOARD_OUT") {
            cfg.page_out = PathBuf::from(path);
        }
        if let Some(src) = get("WC_PLOTLY_SRC") {
            cfg.plotly_src = src;
        }
        cfg
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
