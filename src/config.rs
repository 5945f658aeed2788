use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::{TableFrame, TableStyle};

/// Application-level constants
pub const APP_NAME: &str = "MedAgenda";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Organization name printed in every report masthead.
pub const ORGANIZATION_NAME: &str = "MedAgenda";

pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

const ENV_BIND: &str = "MEDAGENDA_BIND";
const ENV_EXPORTS_DIR: &str = "MEDAGENDA_EXPORTS_DIR";
const ENV_LOGO: &str = "MEDAGENDA_LOGO";
const ENV_LAYOUT: &str = "MEDAGENDA_LAYOUT";

/// Get the application data directory (~/MedAgenda/)
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
}

/// Get the default exports directory for generated reports
pub fn exports_dir() -> PathBuf {
    app_data_dir().join("exports")
}

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "medagenda=info,medagenda_lib=info,tower_http=warn"
}

// ═══════════════════════════════════════════════════════════
// Report layout
// ═══════════════════════════════════════════════════════════

/// Fixed geometry of a report, in millimetres (fonts in points).
///
/// `page_break_threshold` and `section_spacing` have no documented derivation;
/// keep the defaults unless a caller explicitly overrides them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Lowest offset table rows may reach.
    pub bottom_margin: f32,

    pub organization: String,
    pub logo_x: f32,
    pub logo_y: f32,
    pub logo_size: f32,
    pub organization_x: f32,
    pub organization_y: f32,
    pub organization_font_size: f32,

    pub title_y: f32,
    pub title_font_size: f32,
    pub subtitle_y: f32,
    pub subtitle_font_size: f32,

    /// Cursor position for the first section.
    pub start_cursor: f32,
    /// Cursor position after a page break.
    pub top_margin: f32,
    /// Minimum space left below the cursor to start a section on the same page.
    pub page_break_threshold: f32,
    pub heading_font_size: f32,
    /// Gap between a heading baseline and its separator rule.
    pub heading_gap: f32,
    /// Gap between the separator rule and the table.
    pub rule_gap: f32,
    /// Gap after each table.
    pub section_spacing: f32,

    pub table: TableStyle,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin_left: 14.0,
            margin_right: 14.0,
            bottom_margin: 10.0,
            organization: ORGANIZATION_NAME.to_string(),
            logo_x: 14.0,
            logo_y: 10.0,
            logo_size: 18.0,
            organization_x: 36.0,
            organization_y: 21.0,
            organization_font_size: 18.0,
            title_y: 38.0,
            title_font_size: 14.0,
            subtitle_y: 45.0,
            subtitle_font_size: 10.0,
            start_cursor: 55.0,
            top_margin: 20.0,
            page_break_threshold: 40.0,
            heading_font_size: 12.0,
            heading_gap: 2.0,
            rule_gap: 8.0,
            section_spacing: 15.0,
            table: TableStyle::default(),
        }
    }
}

impl LayoutConfig {
    /// Right edge of the content area (196 on A4).
    pub fn content_right(&self) -> f32 {
        self.page_width - self.margin_right
    }

    /// Area tables are drawn in; shares its edges with the section rules.
    pub fn table_frame(&self) -> TableFrame {
        TableFrame {
            left: self.margin_left,
            right: self.content_right(),
            top: self.top_margin,
            bottom: self.page_height - self.bottom_margin,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Server configuration
// ═══════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid bind address {value:?}: {source}")]
    InvalidBind {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("Cannot read layout file {}: {source}", path.display())]
    LayoutRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid layout file {}: {source}", path.display())]
    LayoutParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything the composition root needs to build the service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub exports_dir: PathBuf,
    pub logo: Option<PathBuf>,
    pub layout: LayoutConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8787)),
            exports_dir: exports_dir(),
            logo: None,
            layout: LayoutConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup (environment, test map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_BIND).filter(|v| !v.trim().is_empty()) {
            config.bind = value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidBind { value, source })?;
        }
        if let Some(dir) = lookup(ENV_EXPORTS_DIR).filter(|v| !v.trim().is_empty()) {
            config.exports_dir = PathBuf::from(dir);
        }
        config.logo = lookup(ENV_LOGO)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        if let Some(path) = lookup(ENV_LAYOUT).filter(|v| !v.trim().is_empty()) {
            config.layout = load_layout(PathBuf::from(path))?;
        }

        Ok(config)
    }
}

fn load_layout(path: PathBuf) -> Result<LayoutConfig, ConfigError> {
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(source) => return Err(ConfigError::LayoutRead { path, source }),
    };
    serde_json::from_str(&raw).map_err(|source| ConfigError::LayoutParse { path, source })
}
