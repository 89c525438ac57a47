//! Index-record codec: one note to/from one pipe-delimited line.
//!
//! The body is NOT part of the record; it lives in its own file. The
//! field delimiter cannot legally appear in any field (validated
//! upstream by the command parser).

use crate::models::Note;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

pub const FIELD_DELIM: char = '|';
pub const SUB_DELIM: &str = ";;";

/// `id|title|filename|created|modified|pinned|archived|archive_name|logs|tags`
const FIELD_COUNT: usize = 10;

/// Serialize a note to a single index line.
pub fn encode(note: &Note) -> String {
    let fields = vec![
        note.id.clone(),
        note.title.clone(),
        note.filename.clone(),
        note.created_at.to_rfc3339(),
        note.modified_at.to_rfc3339(),
        if note.pinned { "1" } else { "0" }.to_string(),
        if note.archived { "1" } else { "0" }.to_string(),
        note.archive_name.clone().unwrap_or_default(),
        note.logs.join(SUB_DELIM),
        note.tags.join(SUB_DELIM),
    ];
    fields.join(&FIELD_DELIM.to_string())
}

/// Parse one index line back into a note.
///
/// Returns `None` for any structurally malformed line (wrong field
/// count, unparsable timestamp, flag that is not "0"/"1"); the caller
/// logs and skips it. The body is left empty here and attached later
/// from the note's file.
pub fn decode(line: &str) -> Option<Note> {
    let fields: Vec<&str> = line.split(FIELD_DELIM).collect();
    if fields.len() != FIELD_COUNT {
        return None;
    }

    let created_at = parse_timestamp(fields[3])?;
    let modified_at = parse_timestamp(fields[4])?;
    let pinned = parse_flag(fields[5])?;
    let archived = parse_flag(fields[6])?;
    let archive_name = if fields[7].is_empty() {
        None
    } else {
        Some(fields[7].to_string())
    };

    Some(Note {
        id: fields[0].to_string(),
        title: fields[1].to_string(),
        body: String::new(),
        filename: fields[2].to_string(),
        created_at,
        modified_at,
        pinned,
        archived,
        archive_name,
        tags: split_sub(fields[9]),
        outgoing_links: BTreeSet::new(),
        incoming_links: BTreeSet::new(),
        logs: split_sub(fields[8]),
    })
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_flag(s: &str) -> Option<bool> {
    match s {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}

/// An empty field decodes to an empty sequence, not `[""]`.
fn split_sub(s: &str) -> Vec<String> {
    if s.is_empty() {
        Vec::new()
    } else {
        s.split(SUB_DELIM).map(String::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Note {
        Note::new("Ideas", "brainstorm", "a1b2c3d4".to_string())
    }

    #[test]
    fn test_round_trip_bare_note() {
        let note = sample();
        let decoded = decode(&encode(&note)).unwrap();
        assert_eq!(decoded.id, note.id);
        assert_eq!(decoded.title, note.title);
        assert_eq!(decoded.filename, note.filename);
        assert_eq!(decoded.created_at, note.created_at);
        assert_eq!(decoded.modified_at, note.modified_at);
        assert!(!decoded.pinned);
        assert!(!decoded.archived);
        assert_eq!(decoded.archive_name, None);
        assert!(decoded.tags.is_empty());
        assert!(decoded.logs.is_empty());
        // Body lives in its own file, not in the record.
        assert!(decoded.body.is_empty());
    }

    #[test]
    fn test_round_trip_full_note() {
        let mut note = sample();
        note.pinned = true;
        note.archived = true;
        note.archive_name = Some("archive".to_string());
        note.tags = vec!["deep work".to_string(), "rust".to_string()];
        note.logs = vec!["created".to_string(), "archived by user".to_string()];

        let decoded = decode(&encode(&note)).unwrap();
        assert!(decoded.pinned);
        assert!(decoded.archived);
        assert_eq!(decoded.archive_name.as_deref(), Some("archive"));
        assert_eq!(decoded.tags, note.tags);
        assert_eq!(decoded.logs, note.logs);
    }

    #[test]
    fn test_wrong_field_count_is_rejected() {
        let line = encode(&sample());
        let truncated = line.rsplit_once(FIELD_DELIM).unwrap().0;
        assert!(decode(truncated).is_none());
        assert!(decode(&format!("{}|extra", line)).is_none());
        assert!(decode("").is_none());
    }

    #[test]
    fn test_bad_timestamp_is_rejected() {
        let line = encode(&sample());
        let bad = line.replacen(&sample_created(&line), "not-a-date", 1);
        assert!(decode(&bad).is_none());
    }

    fn sample_created(line: &str) -> String {
        line.split(FIELD_DELIM).nth(3).unwrap().to_string()
    }

    #[test]
    fn test_bad_flag_is_rejected() {
        let note = sample();
        let line = encode(&note);
        let fields: Vec<&str> = line.split(FIELD_DELIM).collect();
        let mut bad = fields.clone();
        bad[5] = "yes";
        assert!(decode(&bad.join("|")).is_none());
        let mut bad = fields;
        bad[6] = "2";
        assert!(decode(&bad.join("|")).is_none());
    }

    #[test]
    fn test_empty_tag_field_decodes_to_empty_vec() {
        let decoded = decode(&encode(&sample())).unwrap();
        assert_eq!(decoded.tags.len(), 0);
        assert_ne!(decoded.tags, vec![String::new()]);
    }
}
