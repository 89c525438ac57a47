//! Zettel CLI - plain-text note manager with repositories, links and tags.
//!
//! Notes live as one index record plus one body file each, grouped into
//! named repositories under a single root. Commands are read from
//! stdin, executed against the in-memory collection and persisted
//! before the next command is accepted.

mod app;
mod config;
mod interact;

use anyhow::Result;
use app::App;
use config::Config;
use std::io::{self, BufRead, Write};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    let config = Config::load();
    let mut app = App::new(config)?;

    println!(
        "zettel - repository '{}' ({} notes). Type 'help' for commands.",
        app.store.current_repository(),
        app.notes.len()
    );

    let stdin = io::stdin();
    prompt()?;
    for line in stdin.lock().lines() {
        let line = line?;
        if !app.handle_line(&line) {
            break;
        }
        prompt()?;
    }
    Ok(())
}

fn prompt() -> Result<()> {
    print!("zettel> ");
    io::stdout().flush()?;
    Ok(())
}
