use redb::TableDefinition;

/// Book records: uuid -> BookRecord (msgpack)
pub const BOOKS: TableDefinition<&str, &[u8]> = TableDefinition::new("books");

/// Note records: uuid -> NoteRecord (msgpack)
pub const NOTES: TableDefinition<&str, &[u8]> = TableDefinition::new("notes");

/// Note index: book uuid -> msgpack Vec of note UUIDs
pub const BOOK_NOTES: TableDefinition<&str, &[u8]> = TableDefinition::new("book_notes");
