//! Application state and command handlers.
//!
//! One command is read, executed against the in-memory collection and
//! persisted before the next command is accepted. Domain-rule
//! violations surface as one-line messages; structural problems are
//! already recovered (and warned about) inside the store.

use crate::config::Config;
use crate::interact;
use anyhow::{anyhow, Result};
use chrono::Utc;
use zettel_store::{
    generate_id, links, Note, Store, StoreError, TagRegistry, LinkDirection,
};

pub struct App {
    pub store: Store,
    pub notes: Vec<Note>,
    pub registry: TagRegistry,
    pub config: Config,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let store = Store::init(config.root_dir())?;
        let notes = store.load();
        let registry = TagRegistry::new(store.load_tags());
        Ok(Self {
            store,
            notes,
            registry,
            config,
        })
    }

    /// Dispatch one input line. Returns false when the user quits.
    pub fn handle_line(&mut self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return true;
        }
        let mut parts = line.split_whitespace();
        let cmd = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        let result = match cmd {
            "quit" | "exit" => return false,
            "help" => {
                self.print_help();
                Ok(())
            }
            "add" => self.cmd_add(&args),
            "list" => self.cmd_list(),
            "view" => self.cmd_view(&args),
            "edit" => self.cmd_edit(&args),
            "retitle" => self.cmd_retitle(&args),
            "pin" => self.cmd_set_pinned(&args, true),
            "unpin" => self.cmd_set_pinned(&args, false),
            "archive" => self.cmd_set_archived(&args, true),
            "unarchive" => self.cmd_set_archived(&args, false),
            "delete" => self.cmd_delete(&args),
            "link" => self.cmd_link(&args),
            "unlink" => self.cmd_unlink(&args),
            "links" => self.cmd_links(&args),
            "tag" => self.cmd_tag(&args),
            "untag" => self.cmd_untag(&args),
            "tags" => self.cmd_tags(&args),
            "repo" => self.cmd_repo(&args),
            "search" => self.cmd_search(&args),
            "log" => self.cmd_log(&args),
            other => Err(anyhow!("Unknown command: {} (try 'help')", other)),
        };
        if let Err(e) = result {
            println!("{}", e);
        }
        true
    }

    fn cmd_add(&mut self, args: &[&str]) -> Result<()> {
        let title = require(args, "add <title>")?.join(" ");
        let seed = format!(
            "{}{}",
            title,
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );
        let mut note = Note::new(&title, "", generate_id(&seed));
        if self.notes.iter().any(|n| n.filename == note.filename) {
            let stem = note.filename.trim_end_matches(".txt").to_string();
            note.rename_file(&format!("{}-{}.txt", stem, note.id));
        }
        self.store.write_note_body(&note);
        println!("Created note {} '{}'", note.id, note.title);
        self.notes.push(note);
        self.persist();
        Ok(())
    }

    fn cmd_list(&mut self) -> Result<()> {
        if self.notes.is_empty() {
            return Err(StoreError::EmptyCollection.into());
        }
        let mut order: Vec<usize> = (0..self.notes.len()).collect();
        order.sort_by(|&a, &b| {
            let (a, b) = (&self.notes[a], &self.notes[b]);
            b.pinned
                .cmp(&a.pinned)
                .then(b.modified_at.cmp(&a.modified_at))
        });
        for idx in order {
            self.print_note_line(&self.notes[idx]);
        }
        Ok(())
    }

    fn cmd_view(&mut self, args: &[&str]) -> Result<()> {
        let idx = self.find_note(require_one(args, "view <id>")?)?;
        let note = &self.notes[idx];
        println!("{} '{}'", note.id, note.title);
        println!("  created  {}", note.created_at.to_rfc3339());
        println!("  modified {}", note.modified_at.to_rfc3339());
        if note.pinned {
            println!("  pinned");
        }
        if let Some(archive) = &note.archive_name {
            println!("  archived in {}", archive);
        }
        if !note.tags.is_empty() {
            println!("  tags: {}", note.tags.join(", "));
        }
        if !note.body.is_empty() {
            println!("---\n{}", note.body);
        }
        for entry in &note.logs {
            println!("  log: {}", entry);
        }
        Ok(())
    }

    fn cmd_edit(&mut self, args: &[&str]) -> Result<()> {
        let idx = self.find_note(require_one(args, "edit <id>")?)?;
        self.store.write_note_body(&self.notes[idx]);
        let path = self.store.note_path(&self.notes[idx]);
        interact::edit_externally(&path, self.config.editor.command.as_deref())?;
        let body = std::fs::read_to_string(&path).unwrap_or_default();
        self.notes[idx].set_body(&body);
        self.persist();
        println!("Updated note {}", self.notes[idx].id);
        Ok(())
    }

    fn cmd_retitle(&mut self, args: &[&str]) -> Result<()> {
        if args.len() < 2 {
            return Err(anyhow!("Usage: retitle <id> <new title>"));
        }
        let idx = self.find_note(args[0])?;
        let title = args[1..].join(" ");
        // The filename stays put: it was derived from the title once,
        // at creation.
        self.notes[idx].set_title(&title);
        self.persist();
        println!("Renamed note {} to '{}'", self.notes[idx].id, title);
        Ok(())
    }

    fn cmd_set_pinned(&mut self, args: &[&str], pinned: bool) -> Result<()> {
        let verb = if pinned { "pin" } else { "unpin" };
        let idx = self.find_note(require_one(args, &format!("{} <id>", verb))?)?;
        self.notes[idx].set_pinned(pinned);
        self.persist();
        println!("{}ned note {}", if pinned { "Pin" } else { "Unpin" }, self.notes[idx].id);
        Ok(())
    }

    fn cmd_set_archived(&mut self, args: &[&str], archived: bool) -> Result<()> {
        let verb = if archived { "archive" } else { "unarchive" };
        let idx = self.find_note(require_one(args, &format!("{} <id>", verb))?)?;
        if self.notes[idx].archived == archived {
            return Err(anyhow!(
                "Note {} is {} archived",
                self.notes[idx].id,
                if archived { "already" } else { "not" }
            ));
        }
        self.store.set_archived(&mut self.notes[idx], archived);
        self.persist();
        println!(
            "{}d note {}",
            if archived { "Archive" } else { "Unarchive" },
            self.notes[idx].id
        );
        Ok(())
    }

    fn cmd_delete(&mut self, args: &[&str]) -> Result<()> {
        let forced = args.contains(&"--force");
        let args: Vec<&str> = args.iter().copied().filter(|a| *a != "--force").collect();
        let idx = self.find_note(require_one(&args, "delete <id> [--force]")?)?;
        if !forced {
            let prompt = format!("Delete note '{}'?", self.notes[idx].title);
            if !interact::confirm(&prompt) {
                println!("Kept note {}", self.notes[idx].id);
                return Ok(());
            }
        }
        let note = self.notes.remove(idx);
        self.store.delete_note_body(&note);
        self.persist();
        println!("Deleted note {} '{}'", note.id, note.title);
        Ok(())
    }

    fn cmd_link(&mut self, args: &[&str]) -> Result<()> {
        let (a, b, both) = self.link_args(args, "link <id> <id> [--both]")?;
        if both {
            links::add_bidirectional(&mut self.notes, a, b)?;
            println!("Linked {} <-> {}", self.notes[a].id, self.notes[b].id);
        } else {
            links::add_directed(&mut self.notes, a, b)?;
            println!("Linked {} -> {}", self.notes[a].id, self.notes[b].id);
        }
        self.persist();
        Ok(())
    }

    fn cmd_unlink(&mut self, args: &[&str]) -> Result<()> {
        let (a, b, both) = self.link_args(args, "unlink <id> <id> [--both]")?;
        if both {
            links::remove_bidirectional(&mut self.notes, a, b)?;
            println!("Unlinked {} <-> {}", self.notes[a].id, self.notes[b].id);
        } else {
            links::remove_directed(&mut self.notes, a, b)?;
            println!("Unlinked {} -> {}", self.notes[a].id, self.notes[b].id);
        }
        self.persist();
        Ok(())
    }

    fn cmd_links(&mut self, args: &[&str]) -> Result<()> {
        if args.len() != 2 {
            return Err(anyhow!("Usage: links <id> <in|out>"));
        }
        let idx = self.find_note(args[0])?;
        let direction = parse_direction(args[1])?;
        let linked = links::linked_notes(&self.notes, idx, direction)?;
        for note in linked {
            println!("{}  {}", note.id, note.title);
        }
        Ok(())
    }

    fn cmd_tag(&mut self, args: &[&str]) -> Result<()> {
        if args.len() != 2 {
            return Err(anyhow!("Usage: tag <id> <tag>"));
        }
        let idx = self.find_note(args[0])?;
        self.registry.tag_note(&mut self.notes[idx], args[1])?;
        self.persist();
        println!("Tagged note {} with '{}'", self.notes[idx].id, args[1]);
        Ok(())
    }

    fn cmd_untag(&mut self, args: &[&str]) -> Result<()> {
        if args.len() != 2 {
            return Err(anyhow!("Usage: untag <id> <tag>"));
        }
        let idx = self.find_note(args[0])?;
        self.registry.untag_note(&mut self.notes[idx], args[1])?;
        self.persist();
        println!("Removed tag '{}' from note {}", args[1], self.notes[idx].id);
        Ok(())
    }

    fn cmd_tags(&mut self, args: &[&str]) -> Result<()> {
        match args {
            [] | ["list"] => {
                if self.registry.is_empty() {
                    return Err(StoreError::EmptyCollection.into());
                }
                for tag in self.registry.tags() {
                    let count = self.notes.iter().filter(|n| n.has_tag(tag)).count();
                    println!("{}  ({} notes)", tag, count);
                }
                Ok(())
            }
            ["add", tag] => {
                self.registry.add_global(tag)?;
                self.persist();
                println!("Added tag '{}'", tag);
                Ok(())
            }
            ["rm", rest @ ..] => {
                let forced = rest.contains(&"--force");
                let tag = rest
                    .iter()
                    .find(|a| **a != "--force")
                    .ok_or_else(|| anyhow!("Usage: tags rm <tag> [--force]"))?;
                let removed = self.registry.remove_global(
                    tag,
                    forced,
                    |prompt| interact::confirm(prompt),
                    &mut self.notes,
                )?;
                if removed {
                    self.persist();
                    println!("Removed tag '{}' everywhere", tag);
                } else {
                    println!("Kept tag '{}'", tag);
                }
                Ok(())
            }
            ["rename", old, new] => {
                self.registry.rename_global(old, new, &mut self.notes)?;
                self.persist();
                println!("Renamed tag '{}' to '{}'", old, new);
                Ok(())
            }
            _ => Err(anyhow!("Usage: tags [list | add <t> | rm <t> [--force] | rename <old> <new>]")),
        }
    }

    fn cmd_repo(&mut self, args: &[&str]) -> Result<()> {
        match args {
            [] | ["list"] => {
                for repo in self.store.repo_list() {
                    let marker = if repo == self.store.current_repository() {
                        "*"
                    } else {
                        " "
                    };
                    println!("{} {}", marker, repo);
                }
                Ok(())
            }
            ["create", name] => {
                if self.store.create_repository(name) {
                    println!("Created repository '{}'", name);
                } else {
                    println!("Repository '{}' already existed", name);
                }
                Ok(())
            }
            ["switch", name] => {
                self.store.change_repository(name);
                self.notes = self.store.load();
                println!("Now in repository '{}'", self.store.current_repository());
                Ok(())
            }
            _ => Err(anyhow!("Usage: repo [list | create <name> | switch <name>]")),
        }
    }

    fn cmd_search(&mut self, args: &[&str]) -> Result<()> {
        let query = require(args, "search <query>")?.join(" ").to_lowercase();
        let mut hits = 0;
        for note in &self.notes {
            let matched = note.title.to_lowercase().contains(&query)
                || note.body.to_lowercase().contains(&query)
                || note.tags.iter().any(|t| t.to_lowercase().contains(&query));
            if matched {
                self.print_note_line(note);
                hits += 1;
            }
        }
        if hits == 0 {
            println!("No notes matching '{}'", query);
        }
        Ok(())
    }

    fn cmd_log(&mut self, args: &[&str]) -> Result<()> {
        if args.len() < 2 {
            return Err(anyhow!("Usage: log <id> <text>"));
        }
        let idx = self.find_note(args[0])?;
        let entry = format!("{} {}", Utc::now().to_rfc3339(), args[1..].join(" "));
        self.notes[idx].append_log(&entry);
        self.persist();
        println!("Logged to note {}", self.notes[idx].id);
        Ok(())
    }

    fn find_note(&self, id: &str) -> Result<usize> {
        self.notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| StoreError::NoteNotFound(id.to_string()).into())
    }

    fn link_args(&self, args: &[&str], usage: &str) -> Result<(usize, usize, bool)> {
        let both = args.contains(&"--both");
        let ids: Vec<&str> = args.iter().copied().filter(|a| *a != "--both").collect();
        if ids.len() != 2 {
            return Err(anyhow!("Usage: {}", usage));
        }
        Ok((self.find_note(ids[0])?, self.find_note(ids[1])?, both))
    }

    /// Persist the full collection and the tag registry. Runs after
    /// every mutation, before the next command is read.
    fn persist(&self) {
        self.store.save(&self.notes);
        self.store.save_tags(self.registry.tags());
    }

    fn print_note_line(&self, note: &Note) {
        let pin = if note.pinned { "*" } else { " " };
        let archived = if note.archived { " [archived]" } else { "" };
        let tags = if note.tags.is_empty() {
            String::new()
        } else {
            format!("  #{}", note.tags.join(" #"))
        };
        let preview = note.preview(self.config.display.preview_length);
        let preview = preview.replace('\n', " ");
        if preview.is_empty() {
            println!("{} {}  {}{}{}", pin, note.id, note.title, archived, tags);
        } else {
            println!(
                "{} {}  {}{}{}  - {}",
                pin, note.id, note.title, archived, tags, preview
            );
        }
    }

    fn print_help(&self) {
        println!("Commands:");
        println!("  add <title>                  create a note");
        println!("  list                         list notes (pinned first)");
        println!("  view <id>                    show one note");
        println!("  edit <id>                    edit the body in $EDITOR");
        println!("  retitle <id> <title>         change the title");
        println!("  pin/unpin <id>               toggle pinned state");
        println!("  archive/unarchive <id>       move between notes/ and archive/");
        println!("  delete <id> [--force]        remove a note");
        println!("  link <id> <id> [--both]      add a directed (or two-way) link");
        println!("  unlink <id> <id> [--both]    remove link(s)");
        println!("  links <id> <in|out>          show linked notes");
        println!("  tag <id> <tag>               tag a note");
        println!("  untag <id> <tag>             untag a note");
        println!("  tags [add|rm|rename|list]    manage the global tag registry");
        println!("  repo [list|create|switch]    manage repositories");
        println!("  search <query>               search titles, bodies and tags");
        println!("  log <id> <text>              append an audit line");
        println!("  quit                         exit");
    }
}

fn parse_direction(s: &str) -> Result<LinkDirection> {
    match s {
        "in" | "incoming" => Ok(LinkDirection::Incoming),
        "out" | "outgoing" => Ok(LinkDirection::Outgoing),
        other => Err(anyhow!("Unknown direction: {} (use in|out)", other)),
    }
}

fn require<'a>(args: &[&'a str], usage: &str) -> Result<Vec<&'a str>> {
    if args.is_empty() {
        Err(anyhow!("Usage: {}", usage))
    } else {
        Ok(args.to_vec())
    }
}

fn require_one<'a>(args: &[&'a str], usage: &str) -> Result<&'a str> {
    if args.len() == 1 {
        Ok(args[0])
    } else {
        Err(anyhow!("Usage: {}", usage))
    }
}
