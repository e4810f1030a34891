use chrono::{DateTime, TimeZone, Utc};

/// A book from a bookstore catalogue, the entity every operation persists.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    /// Database identity. `None` until the row is persisted.
    pub id: Option<i64>,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub quantity: i64,
    pub published_at: DateTime<Utc>,
}

impl Book {
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

fn published_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Build one unpersisted book. Field values are fixed, only identity varies
/// once the book is stored.
pub fn new_book() -> Book {
    Book {
        id: None,
        isbn: String::from("978-3-16-148410-1"),
        title: String::from("Learning Go: An Idiomatic Approach to Real-World Go Programming"),
        author: String::from("Jon Bodner"),
        genre: String::from("Programming"),
        quantity: 20,
        published_at: published_at(),
    }
}

pub fn new_books(quantity: usize) -> Vec<Book> {
    (0..quantity).map(|_| new_book()).collect()
}

/// Unset every identity so the batch can be inserted again.
pub fn reset_identity(books: &mut [Book]) {
    for book in books.iter_mut() {
        book.id = None;
    }
}

/// Split a batch into slices of at most `size` books.
pub fn chunk(books: &[Book], size: usize) -> std::slice::Chunks<'_, Book> {
    books.chunks(size.max(1))
}
