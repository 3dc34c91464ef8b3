//! CLI command implementations

pub mod config;
pub mod ls;
pub mod record;
pub mod status;

pub use config::execute as config;
pub use ls::execute as ls;
pub use record::execute as record;
pub use status::execute as status;

use crate::config::{Config, ConfigManager};
use crate::error::PrebuiltResult;
use crate::storage::FileStore;

/// Open the build store configured for this repository
async fn open_store(manager: &ConfigManager, config: &Config) -> PrebuiltResult<FileStore> {
    Ok(FileStore::open(manager.storage_dir(config)).await?)
}

/// Shorten an id or digest for table output
fn short(s: &str, len: usize) -> &str {
    match s.char_indices().nth(len) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_truncates() {
        assert_eq!(short("sha384:abcdef", 10), "sha384:abc");
        assert_eq!(short("abc", 10), "abc");
    }
}
