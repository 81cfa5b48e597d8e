//! Scratch locations for files written by tests.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// The workspace root, one level above this crate's manifest.
fn workspace_root() -> &'static Path {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir.parent().unwrap_or(manifest_dir)
}

/// Directory shared by all tests for artifacts worth inspecting by hand.
pub fn test_output_dir() -> &'static Path {
    static DIR: OnceLock<PathBuf> = OnceLock::new();
    DIR.get_or_init(|| {
        let dir = workspace_root().join("test_output");
        std::fs::create_dir_all(&dir).expect("Failed to create test_output directory");
        dir
    })
}

/// Path of a file or subdirectory inside [`test_output_dir`].
pub fn test_output_path(name: &str) -> PathBuf {
    test_output_dir().join(name)
}
