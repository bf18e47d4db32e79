pub mod config;
pub mod init;
pub mod resource;
pub mod roadmap;
pub mod serve;
pub mod user;

use anyhow::Context;
use makaam_core::config::Config;
use makaam_core::paths;
use makaam_core::store::Store;
use std::path::Path;

/// Open the store of an initialized data root.
pub(crate) fn open_store(root: &Path) -> anyhow::Result<Store> {
    Config::load(root)?;
    let path = paths::db_path(root);
    Store::open(&path).with_context(|| {
        format!(
            "failed to open {} (is `makaam serve` running against this root?)",
            path.display()
        )
    })
}
