//! Interactive collaborators: confirmation prompts and the external
//! editor. Both block until the user is done; no timeout is imposed.

use anyhow::{bail, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::Command;

/// Blocking yes/no prompt on stdin. Anything but y/yes is a no.
pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Launch the external editor on a file and wait for it to exit.
pub fn edit_externally(path: &Path, editor_override: Option<&str>) -> Result<()> {
    let editor = editor_override
        .map(String::from)
        .or_else(|| std::env::var("EDITOR").ok())
        .unwrap_or_else(|| "vi".to_string());

    let status = Command::new(&editor).arg(path).status()?;
    if !status.success() {
        bail!("editor '{}' exited with {}", editor, status);
    }
    Ok(())
}
