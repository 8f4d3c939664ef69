use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::NoteRecord;
use super::tables::*;

impl Database {
    // ========================================================================
    // Note operations
    // ========================================================================

    /// Store a note record and update the per-book index
    pub fn put_note(&self, note: &NoteRecord) -> Result<(), DatabaseError> {
        debug_assert!(!note.id.is_empty(), "note id must not be empty");
        debug_assert!(!note.book_id.is_empty(), "note book_id must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(NOTES)?;
            let data = rmp_serde::to_vec_named(note)?;
            table.insert(note.id.as_str(), data.as_slice())?;

            // Maintain book index
            let mut index_table = write_txn.open_table(BOOK_NOTES)?;
            let mut note_ids: Vec<String> = match index_table.get(note.book_id.as_str())? {
                Some(data) => rmp_serde::from_slice(data.value())?,
                None => Vec::new(),
            };

            if !note_ids.contains(&note.id) {
                note_ids.push(note.id.clone());
                let index_data = rmp_serde::to_vec_named(&note_ids)?;
                index_table.insert(note.book_id.as_str(), index_data.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a note by its UUID
    pub fn get_note(&self, id: &str) -> Result<Option<NoteRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(NOTES)?;

        match table.get(id)? {
            Some(data) => {
                let note: NoteRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(note))
            }
            None => Ok(None),
        }
    }

    /// Get all notes for a book, newest first. Ties on creation time break
    /// by id so the order is stable.
    pub fn notes_for_book(&self, book_id: &str) -> Result<Vec<NoteRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let index_table = read_txn.open_table(BOOK_NOTES)?;
        let notes_table = read_txn.open_table(NOTES)?;

        let note_ids: Vec<String> = match index_table.get(book_id)? {
            Some(data) => rmp_serde::from_slice(data.value())?,
            None => return Ok(Vec::new()),
        };

        let mut notes = Vec::new();
        for note_id in note_ids {
            if let Some(data) = notes_table.get(note_id.as_str())? {
                let note: NoteRecord = rmp_serde::from_slice(data.value())?;
                notes.push(note);
            }
        }

        notes.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(notes)
    }

    /// Delete a note by its UUID and clean up the per-book index
    pub fn delete_note(&self, id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        // Get the note for index cleanup
        let book_id: Option<String> = {
            let table = write_txn.open_table(NOTES)?;
            let result = match table.get(id)? {
                Some(data) => {
                    let note: NoteRecord = rmp_serde::from_slice(data.value())?;
                    Some(note.book_id)
                }
                None => None,
            };
            result
        };

        let deleted = match book_id {
            Some(book_id) => {
                {
                    let mut table = write_txn.open_table(NOTES)?;
                    table.remove(id)?;
                }

                let note_ids: Option<Vec<String>> = {
                    let index_table = write_txn.open_table(BOOK_NOTES)?;
                    let result = index_table.get(book_id.as_str())?;
                    match result {
                        Some(data) => Some(rmp_serde::from_slice(data.value())?),
                        None => None,
                    }
                };

                if let Some(mut ids) = note_ids {
                    ids.retain(|nid| nid != id);
                    let mut index_table = write_txn.open_table(BOOK_NOTES)?;
                    if ids.is_empty() {
                        index_table.remove(book_id.as_str())?;
                    } else {
                        let new_data = rmp_serde::to_vec_named(&ids)?;
                        index_table.insert(book_id.as_str(), new_data.as_slice())?;
                    }
                }
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(deleted)
    }
}
