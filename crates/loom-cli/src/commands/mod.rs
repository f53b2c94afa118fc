pub mod render;
pub mod replay;

use std::path::Path;

use crate::script::{self, Replay};

/// Load and replay a script file.
fn replay_file(path: &Path) -> Result<Replay, String> {
    let script = script::load(path)?;
    Ok(script::replay(script))
}
