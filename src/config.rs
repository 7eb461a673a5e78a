//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/ctree/ctree.toml`
//! 3. Local config: `<base_dir>/.ctree.toml`
//! 4. Environment variables: `CTREE_*` prefix (nested keys joined with `__`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;

/// Catalog listing and hierarchy settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Page size for nodes created without an explicit `products_per_page`
    pub default_products_per_page: u32,
    /// Upper bound for ancestor walks (breadcrumbs, full names)
    pub max_tree_depth: usize,
    /// Label of the synthetic first breadcrumb
    pub home_label: String,
    /// URL of the synthetic first breadcrumb
    pub home_url: String,
    /// Path prefix of canonical node addresses
    pub url_prefix: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_products_per_page: 10,
            max_tree_depth: 256,
            home_label: "Home".into(),
            home_url: "/".into(),
            url_prefix: "/nodes".into(),
        }
    }
}

/// Sitemap projection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SitemapConfig {
    /// Nodes per sitemap page
    pub page_size: u32,
    /// Change-frequency hint emitted for every node
    pub changefreq: String,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            page_size: 1000,
            changefreq: "daily".into(),
        }
    }
}

/// Raw catalog config for intermediate parsing (`None` → not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawCatalogConfig {
    pub default_products_per_page: Option<u32>,
    pub max_tree_depth: Option<usize>,
    pub home_label: Option<String>,
    pub home_url: Option<String>,
    pub url_prefix: Option<String>,
}

/// Raw sitemap config for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSitemapConfig {
    pub page_size: Option<u32>,
    pub changefreq: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub base_dir: Option<PathBuf>,
    pub store_file: Option<String>,
    pub catalog: RawCatalogConfig,
    pub sitemap: RawSitemapConfig,
}

/// Unified configuration for ctree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the catalog file and local config (default: ~/.ctree)
    pub base_dir: PathBuf,
    /// Catalog file name inside `base_dir`
    pub store_file: String,
    pub catalog: CatalogConfig,
    pub sitemap: SitemapConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: dirs_default_base_dir(),
            store_file: "catalog.toml".into(),
            catalog: CatalogConfig::default(),
            sitemap: SitemapConfig::default(),
        }
    }
}

/// Get the default base directory (~/.ctree).
fn dirs_default_base_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".ctree"))
        .unwrap_or_else(|| PathBuf::from("~/.ctree"))
}

/// Get the XDG config directory for ctree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ctree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("ctree.toml"))
}

/// Get the path to the local config file in a base directory.
pub fn local_config_path(base_dir: &Path) -> PathBuf {
    base_dir.join(".ctree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
fn expand(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Path of the catalog file.
    pub fn store_path(&self) -> PathBuf {
        self.base_dir.join(&self.store_file)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand(self.base_dir.to_string_lossy().as_ref());
        self.base_dir = PathBuf::from(expanded);
    }

    /// Overlay a parsed file onto self: specified values win.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let c = &overlay.catalog;
        let s = &overlay.sitemap;
        Self {
            base_dir: overlay
                .base_dir
                .clone()
                .unwrap_or_else(|| self.base_dir.clone()),
            store_file: overlay
                .store_file
                .clone()
                .unwrap_or_else(|| self.store_file.clone()),
            catalog: CatalogConfig {
                default_products_per_page: c
                    .default_products_per_page
                    .unwrap_or(self.catalog.default_products_per_page),
                max_tree_depth: c.max_tree_depth.unwrap_or(self.catalog.max_tree_depth),
                home_label: c
                    .home_label
                    .clone()
                    .unwrap_or_else(|| self.catalog.home_label.clone()),
                home_url: c
                    .home_url
                    .clone()
                    .unwrap_or_else(|| self.catalog.home_url.clone()),
                url_prefix: c
                    .url_prefix
                    .clone()
                    .unwrap_or_else(|| self.catalog.url_prefix.clone()),
            },
            sitemap: SitemapConfig {
                page_size: s.page_size.unwrap_or(self.sitemap.page_size),
                changefreq: s
                    .changefreq
                    .clone()
                    .unwrap_or_else(|| self.sitemap.changefreq.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `base_dir` - Explicit base directory (e.g. from `--base-dir`); wins over every layer
    pub fn load(base_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_with(global_config_path().as_deref(), base_dir)
    }

    /// Load settings from an explicit global config location.
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. `global` config file (if it exists)
    /// 3. Local config: `<base_dir>/.ctree.toml`
    /// 4. Environment variables: `CTREE_*`
    /// 5. The explicit `base_dir` argument
    pub fn load_with(global: Option<&Path>, base_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global {
            if global_path.exists() {
                debug!("config: global {}", global_path.display());
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config lives in the effective base directory
        if let Some(dir) = base_dir {
            current.base_dir = dir.to_path_buf();
        }
        current.expand_paths();
        let local_path = local_config_path(&current.base_dir);
        if local_path.exists() {
            debug!("config: local {}", local_path.display());
            let raw = load_raw_settings(&local_path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        // 5. Explicit base directory
        if let Some(dir) = base_dir {
            current.base_dir = dir.to_path_buf();
        }
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply CTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("CTREE")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("base_dir") {
            settings.base_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("store_file") {
            settings.store_file = val;
        }
        if let Ok(val) = config.get::<u32>("catalog.default_products_per_page") {
            settings.catalog.default_products_per_page = val;
        }
        if let Ok(val) = config.get::<usize>("catalog.max_tree_depth") {
            settings.catalog.max_tree_depth = val;
        }
        if let Ok(val) = config.get_string("catalog.home_label") {
            settings.catalog.home_label = val;
        }
        if let Ok(val) = config.get_string("catalog.home_url") {
            settings.catalog.home_url = val;
        }
        if let Ok(val) = config.get_string("catalog.url_prefix") {
            settings.catalog.url_prefix = val;
        }
        if let Ok(val) = config.get::<u32>("sitemap.page_size") {
            settings.sitemap.page_size = val;
        }
        if let Ok(val) = config.get_string("sitemap.changefreq") {
            settings.sitemap.changefreq = val;
        }

        Ok(settings)
    }

    /// Reject values the services cannot work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        fn invalid(message: &str) -> Result<(), ApplicationError> {
            Err(ApplicationError::Config {
                message: message.to_string(),
            })
        }
        if self.catalog.default_products_per_page == 0 {
            return invalid("catalog.default_products_per_page must be at least 1");
        }
        if self.catalog.max_tree_depth == 0 {
            return invalid("catalog.max_tree_depth must be at least 1");
        }
        if self.sitemap.page_size == 0 {
            return invalid("sitemap.page_size must be at least 1");
        }
        if self.store_file.trim().is_empty() {
            return invalid("store_file must not be empty");
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# ctree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/ctree/ctree.toml
#   Local:  <base_dir>/.ctree.toml
#   Env:    CTREE_* environment variables, nested keys joined with "__"
#           e.g. CTREE_SITEMAP__PAGE_SIZE=500

# Directory holding the catalog file
# base_dir = "~/.ctree"

# Catalog file name inside base_dir
# store_file = "catalog.toml"

[catalog]
# Page size for nodes created without --per-page
# default_products_per_page = 10

# Maximum depth followed when resolving breadcrumbs
# max_tree_depth = 256

# Label of the leading breadcrumb
# home_label = "Home"

# URL of the leading breadcrumb
# home_url = "/"

# Prefix of node addresses: <url_prefix>/<id>/<slug>/<page>
# url_prefix = "/nodes"

[sitemap]
# Nodes per sitemap page
# page_size = 1000

# Change-frequency hint for every node
# changefreq = "daily"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_settings_when_created_then_uses_source_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.catalog.default_products_per_page, 10);
        assert_eq!(settings.catalog.home_label, "Home");
        assert_eq!(settings.sitemap.changefreq, "daily");
        assert!(settings.base_dir.to_string_lossy().contains(".ctree"));
    }

    #[test]
    fn given_tilde_in_base_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            base_dir: PathBuf::from("~/.ctree"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let base = settings.base_dir.to_string_lossy();
        assert!(base.starts_with(&home), "base_dir should start with home dir: {base}");
        assert!(!base.contains('~'), "base_dir should not contain tilde: {base}");
    }

    #[test]
    fn given_partial_overlay_when_merging_then_only_specified_values_change() {
        let base = Settings::default();
        let overlay = RawSettings {
            catalog: RawCatalogConfig {
                home_label: Some("Start".into()),
                ..RawCatalogConfig::default()
            },
            sitemap: RawSitemapConfig {
                page_size: Some(50),
                ..RawSitemapConfig::default()
            },
            ..RawSettings::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.catalog.home_label, "Start");
        assert_eq!(merged.sitemap.page_size, 50);
        assert_eq!(merged.catalog.default_products_per_page, 10);
        assert_eq!(merged.sitemap.changefreq, "daily");
        assert_eq!(merged.store_file, "catalog.toml");
    }

    #[test]
    fn given_zero_page_size_when_validating_then_config_error() {
        let mut settings = Settings::default();
        settings.sitemap.page_size = 0;
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { .. })
        ));
    }

    #[test]
    fn given_template_when_parsing_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.base_dir.is_none());
        assert!(raw.catalog.home_label.is_none());
    }
}
