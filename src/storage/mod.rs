mod books;
pub mod db;
pub mod models;
mod notes;
mod tables;

pub use db::{Database, DatabaseError};
pub use tables::*;
