use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::{BookRecord, BookStatus};
use super::tables::*;

impl Database {
    // ========================================================================
    // Book operations
    // ========================================================================

    /// Store a book record
    pub fn put_book(&self, book: &BookRecord) -> Result<(), DatabaseError> {
        debug_assert!(!book.id.is_empty(), "book id must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(BOOKS)?;
            let data = rmp_serde::to_vec_named(book)?;
            table.insert(book.id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a book by its UUID
    pub fn get_book(&self, id: &str) -> Result<Option<BookRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(BOOKS)?;

        match table.get(id)? {
            Some(data) => {
                let book: BookRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(book))
            }
            None => Ok(None),
        }
    }

    /// Get all books, in store iteration order
    pub fn list_books(&self) -> Result<Vec<BookRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(BOOKS)?;

        let mut books = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let book: BookRecord = rmp_serde::from_slice(value.value())?;
            books.push(book);
        }

        Ok(books)
    }

    /// Apply a partial update to a book's mutable fields. `created_at` and
    /// `id` never change. Returns the updated record, or `None` if no book
    /// matches the id.
    pub fn update_book(
        &self,
        id: &str,
        title: Option<&str>,
        author: Option<&str>,
        genre: Option<&str>,
        status: Option<BookStatus>,
        image: Option<&str>,
    ) -> Result<Option<BookRecord>, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing = {
            let table = write_txn.open_table(BOOKS)?;
            let result = match table.get(id)? {
                Some(data) => {
                    let book: BookRecord = rmp_serde::from_slice(data.value())?;
                    Some(book)
                }
                None => None,
            };
            result
        };

        let updated = match existing {
            Some(mut book) => {
                if let Some(t) = title {
                    book.title = t.to_string();
                }
                if let Some(a) = author {
                    book.author = a.to_string();
                }
                if let Some(g) = genre {
                    book.genre = Some(g.to_string());
                }
                if let Some(s) = status {
                    book.status = s;
                }
                if let Some(i) = image {
                    book.image = i.to_string();
                }

                let serialized = rmp_serde::to_vec_named(&book)?;
                let mut table = write_txn.open_table(BOOKS)?;
                table.insert(id, serialized.as_slice())?;
                Some(book)
            }
            None => None,
        };

        write_txn.commit()?;
        Ok(updated)
    }

    /// Delete a book by its UUID. Associated notes are left in place.
    pub fn delete_book(&self, id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let mut table = write_txn.open_table(BOOKS)?;
        let deleted = table.remove(id)?.is_some();
        drop(table);

        write_txn.commit()?;
        Ok(deleted)
    }
}
