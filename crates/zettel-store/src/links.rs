//! Link graph operations over already-loaded notes.
//!
//! An edge A->B is B in A's outgoing set AND A in B's incoming set;
//! the two halves are always added and removed together. Callers never
//! observe one half without the other. No note may link to itself.

use crate::error::{StoreError, StoreResult};
use crate::models::Note;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDirection {
    Incoming,
    Outgoing,
}

impl LinkDirection {
    pub fn label(&self) -> &'static str {
        match self {
            LinkDirection::Incoming => "incoming",
            LinkDirection::Outgoing => "outgoing",
        }
    }
}

/// Add the directed edge `src -> dst`.
pub fn add_directed(notes: &mut [Note], src: usize, dst: usize) -> StoreResult<()> {
    if src == dst {
        return Err(StoreError::SelfLink);
    }
    let src_id = notes[src].id.clone();
    let dst_id = notes[dst].id.clone();
    if notes[src].outgoing_links.contains(&dst_id) {
        return Err(StoreError::AlreadyLinked(src_id, dst_id));
    }

    let (source, target) = pair_mut(notes, src, dst);
    source.outgoing_links.insert(dst_id);
    target.incoming_links.insert(src_id);
    source.touch();
    target.touch();
    Ok(())
}

/// Link `a` and `b` in both directions. A pre-existing single direction
/// is upgraded without duplicating the existing half; it is an error
/// only when both directions already exist.
pub fn add_bidirectional(notes: &mut [Note], a: usize, b: usize) -> StoreResult<()> {
    if a == b {
        return Err(StoreError::SelfLink);
    }
    let a_id = notes[a].id.clone();
    let b_id = notes[b].id.clone();
    let ab = notes[a].outgoing_links.contains(&b_id);
    let ba = notes[b].outgoing_links.contains(&a_id);
    if ab && ba {
        return Err(StoreError::AlreadyLinked(a_id, b_id));
    }

    let (first, second) = pair_mut(notes, a, b);
    if !ab {
        first.outgoing_links.insert(b_id.clone());
        second.incoming_links.insert(a_id.clone());
    }
    if !ba {
        second.outgoing_links.insert(a_id);
        first.incoming_links.insert(b_id);
    }
    first.touch();
    second.touch();
    Ok(())
}

/// Remove the directed edge `src -> dst`.
pub fn remove_directed(notes: &mut [Note], src: usize, dst: usize) -> StoreResult<()> {
    if src == dst {
        return Err(StoreError::SelfLink);
    }
    let src_id = notes[src].id.clone();
    let dst_id = notes[dst].id.clone();
    if !notes[src].outgoing_links.contains(&dst_id) {
        return Err(StoreError::NotLinked(src_id, dst_id));
    }

    let (source, target) = pair_mut(notes, src, dst);
    source.outgoing_links.remove(&dst_id);
    target.incoming_links.remove(&src_id);
    source.touch();
    target.touch();
    Ok(())
}

/// Remove every directed edge between `a` and `b`. It is not an error
/// for only one direction to have existed; it is an error only when no
/// direction exists at all.
pub fn remove_bidirectional(notes: &mut [Note], a: usize, b: usize) -> StoreResult<()> {
    if a == b {
        return Err(StoreError::SelfLink);
    }
    let a_id = notes[a].id.clone();
    let b_id = notes[b].id.clone();
    let ab = notes[a].outgoing_links.contains(&b_id);
    let ba = notes[b].outgoing_links.contains(&a_id);
    if !ab && !ba {
        return Err(StoreError::NotLinked(a_id, b_id));
    }

    let (first, second) = pair_mut(notes, a, b);
    if ab {
        first.outgoing_links.remove(&b_id);
        second.incoming_links.remove(&a_id);
    }
    if ba {
        second.outgoing_links.remove(&a_id);
        first.incoming_links.remove(&b_id);
    }
    first.touch();
    second.touch();
    Ok(())
}

/// Notes referenced by the requested link set of `notes[idx]`.
///
/// Entries that no longer resolve (the other note was deleted without
/// cleanup) are dropped; when NOTHING resolves the whole set is
/// dangling and that is reported as such.
pub fn linked_notes(notes: &[Note], idx: usize, direction: LinkDirection) -> StoreResult<Vec<&Note>> {
    let note = &notes[idx];
    let set = match direction {
        LinkDirection::Incoming => &note.incoming_links,
        LinkDirection::Outgoing => &note.outgoing_links,
    };
    if set.is_empty() {
        return Err(StoreError::NoLinks(
            note.id.clone(),
            direction.label().to_string(),
        ));
    }

    let resolved: Vec<&Note> = set
        .iter()
        .filter_map(|id| notes.iter().find(|n| &n.id == id))
        .collect();
    if resolved.is_empty() {
        return Err(StoreError::DanglingLinks(
            note.id.clone(),
            direction.label().to_string(),
        ));
    }
    Ok(resolved)
}

/// Mutable references to two distinct notes of the same slice.
fn pair_mut(notes: &mut [Note], a: usize, b: usize) -> (&mut Note, &mut Note) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = notes.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = notes.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
