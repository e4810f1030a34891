//! Deterministic benchmark entities.

mod book;

pub use book::{Book, chunk, new_book, new_books, reset_identity};
