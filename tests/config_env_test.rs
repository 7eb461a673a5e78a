//! Environment overrides for Settings.
//!
//! Kept in its own test binary: it mutates the process environment, which
//! would race with the other config tests.

use std::env;
use std::fs;

use tempfile::TempDir;

use catalog_tree::config::{local_config_path, Settings};

#[test]
fn given_env_vars_when_loading_then_override_file_values() {
    let base = TempDir::new().unwrap();
    fs::write(
        local_config_path(base.path()),
        "[sitemap]\npage_size = 200\n\n[catalog]\nhome_label = \"Local\"\n",
    )
    .unwrap();
    env::set_var("CTREE_SITEMAP__PAGE_SIZE", "500");
    env::set_var("CTREE_CATALOG__URL_PREFIX", "/c");

    let settings = Settings::load_with(None, Some(base.path()));

    env::remove_var("CTREE_SITEMAP__PAGE_SIZE");
    env::remove_var("CTREE_CATALOG__URL_PREFIX");
    let settings = settings.unwrap();
    assert_eq!(settings.sitemap.page_size, 500);
    assert_eq!(settings.catalog.url_prefix, "/c");
    assert_eq!(settings.catalog.home_label, "Local");
}
