//! The single runtime knob named by spec §6.3.

use std::env;
use std::path::PathBuf;

/// Directory vector artifacts are written to, or `None` to skip writing
/// (spec §6.3: "a single environment variable `TEST_DATA_OUT`... no other
/// runtime configuration").
pub fn test_data_out() -> Option<PathBuf> {
    let dir = env::var("TEST_DATA_OUT").ok().map(PathBuf::from);
    if let Some(dir) = &dir {
        tracing::info!(dir = %dir.display(), "writing test vectors");
    }
    dir
}
