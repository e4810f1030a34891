//! SQLite backends. All three share one database file and the `books` table;
//! they differ only in how they issue statements.

mod cached;
mod raw;
mod tx;

use std::fmt::Display;
use std::hint::black_box;

use log::info;
use rusqlite::{Connection, Row, Statement, ToSql, params};

use crate::core::BenchError;
use crate::fixture::{Book, chunk, new_books};
use crate::measure::Measure;

use super::BenchConfig;

pub use cached::CachedBackend;
pub use raw::RawBackend;
pub use tx::TxBackend;

const COLUMNS: &str = "isbn, title, author, genre, quantity, published_at";

const CREATE_BOOKS: &str = "CREATE TABLE IF NOT EXISTS books (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    isbn         TEXT    NOT NULL,
    title        TEXT    NOT NULL,
    author       TEXT    NOT NULL,
    genre        TEXT    NOT NULL,
    quantity     INTEGER NOT NULL,
    published_at TEXT    NOT NULL
)";

pub(crate) const INSERT_BOOK: &str = "INSERT INTO books (isbn, title, author, genre, quantity, published_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

pub(crate) const INSERT_BOOK_RETURNING: &str = "INSERT INTO books (isbn, title, author, genre, quantity, published_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id";

pub(crate) const UPDATE_BOOK: &str = "UPDATE books SET isbn = ?1, title = ?2, author = ?3, genre = ?4, \
     quantity = ?5, published_at = ?6 WHERE id = ?7";

pub(crate) const DELETE_BOOK: &str = "DELETE FROM books WHERE id = ?1";

pub(crate) const SELECT_BY_ID: &str = "SELECT id, isbn, title, author, genre, quantity, published_at \
     FROM books WHERE id = ?1";

pub(crate) const SELECT_PAGE: &str = "SELECT id, isbn, title, author, genre, quantity, published_at \
     FROM books ORDER BY id LIMIT ?2 OFFSET ?1";

/// Open the shared database and leave an empty `books` table behind.
pub(crate) fn open(config: &BenchConfig) -> Result<Connection, BenchError> {
    let conn = Connection::open(&config.database)?;
    conn.busy_timeout(config.busy_timeout)?;
    let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.execute_batch("PRAGMA synchronous = NORMAL")?;
    conn.execute(CREATE_BOOKS, [])?;
    let cleared = conn.execute("DELETE FROM books", [])?;
    info!(
        "Opened {} (journal_mode={}, cleared {} rows)",
        config.database.display(),
        mode,
        cleared
    );
    Ok(conn)
}

pub(crate) fn close(conn: Option<Connection>) -> Result<(), BenchError> {
    match conn {
        Some(conn) => conn.close().map_err(|(_, e)| e.into()),
        None => Ok(()),
    }
}

pub(crate) fn book_params(book: &Book) -> [&dyn ToSql; 6] {
    [
        &book.isbn,
        &book.title,
        &book.author,
        &book.genre,
        &book.quantity,
        &book.published_at,
    ]
}

pub(crate) fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        isbn: row.get(1)?,
        title: row.get(2)?,
        author: row.get(3)?,
        genre: row.get(4)?,
        quantity: row.get(5)?,
        published_at: row.get(6)?,
    })
}

/// Multi-row insert statement for `rows` books.
pub(crate) fn bulk_insert_sql(rows: usize, returning: bool) -> String {
    let mut sql = format!("INSERT INTO books ({}) VALUES ", COLUMNS);
    for row in 0..rows {
        if row > 0 {
            sql.push(',');
        }
        let base = row * 6;
        sql.push_str(&format!(
            "(?{}, ?{}, ?{}, ?{}, ?{}, ?{})",
            base + 1,
            base + 2,
            base + 3,
            base + 4,
            base + 5,
            base + 6
        ));
    }
    if returning {
        sql.push_str(" RETURNING id");
    }
    sql
}

pub(crate) fn bulk_params(books: &[Book]) -> Vec<&dyn ToSql> {
    let mut values: Vec<&dyn ToSql> = Vec::with_capacity(books.len() * 6);
    for book in books {
        values.extend_from_slice(&book_params(book));
    }
    values
}

/// Insert `count` fresh books, one transaction per batch, and return their
/// ids. Used for unmeasured setup only.
pub(crate) fn seed_books(
    conn: &Connection,
    count: usize,
    batch_size: usize,
) -> Result<Vec<i64>, BenchError> {
    let books = new_books(count);
    let mut ids = Vec::with_capacity(count);
    for batch in chunk(&books, batch_size) {
        let tx = conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_BOOK)?;
            for book in batch {
                stmt.execute(&book_params(book)[..])?;
                ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()?;
    }
    Ok(ids)
}

pub(crate) fn seed_one(conn: &Connection) -> Result<i64, BenchError> {
    let ids = seed_books(conn, 1, 1)?;
    ids.first()
        .copied()
        .ok_or_else(|| BenchError::BackendError("seeding returned no id".to_string()))
}

pub(crate) fn update_params<'a>(book: &'a Book, id: &'a i64) -> [&'a dyn ToSql; 7] {
    let [isbn, title, author, genre, quantity, published_at] = book_params(book);
    [isbn, title, author, genre, quantity, published_at, id]
}

/// Record a failed iteration with the timer paused, so the bookkeeping
/// stays out of the measurement.
pub(crate) fn check<T, E: Display>(m: &mut dyn Measure, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            m.pause();
            m.record_failure(e.to_string());
            m.resume();
            None
        }
    }
}

/// Drain the timed steps of one iteration and keep only the first error, so
/// an iteration fails at most once however many statements it issues.
pub(crate) fn first_error<T, E>(steps: impl Iterator<Item = Result<T, E>>) -> Result<(), E> {
    let mut first = None;
    for step in steps {
        match step {
            Ok(value) => {
                black_box(value);
            }
            Err(e) => {
                first.get_or_insert(e);
            }
        }
    }
    first.map_or(Ok(()), Err)
}

/// Read one page into a fresh buffer. The buffer allocation is part of the
/// measured cost.
pub(crate) fn read_page(
    stmt: &mut Statement<'_>,
    offset: i64,
    size: usize,
) -> Result<Vec<Book>, BenchError> {
    let mut page = Vec::with_capacity(size);
    let rows = stmt.query_map(params![offset, size as i64], book_from_row)?;
    for row in rows {
        page.push(row?);
    }
    Ok(page)
}

pub(crate) fn not_initialized(m: &mut dyn Measure, name: &str) {
    m.pause();
    m.record_failure(format!("{} used before init", name));
    m.resume();
}

pub(crate) fn page_offsets(page_rows: usize, page_size: usize) -> impl Iterator<Item = i64> {
    (0..page_rows).step_by(page_size.max(1)).map(|offset| offset as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::new_book;

    #[test]
    fn test_bulk_insert_sql_placeholders() {
        assert_eq!(
            bulk_insert_sql(2, false),
            "INSERT INTO books (isbn, title, author, genre, quantity, published_at) VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6),(?7, ?8, ?9, ?10, ?11, ?12)"
        );
        assert!(bulk_insert_sql(1, true).ends_with(" RETURNING id"));
    }

    #[test]
    fn test_bulk_params_flatten() {
        let books = vec![new_book(), new_book(), new_book()];
        assert_eq!(bulk_params(&books).len(), 18);
    }

    #[test]
    fn test_page_offsets() {
        let offsets: Vec<i64> = page_offsets(250, 100).collect();
        assert_eq!(offsets, vec![0, 100, 200]);
        assert_eq!(page_offsets(10, 0).count(), 10);
    }

    #[test]
    fn test_seed_and_read_back() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(CREATE_BOOKS, []).unwrap();

        let ids = seed_books(&conn, 5, 2).unwrap();
        assert_eq!(ids.len(), 5);

        let book = conn
            .query_row(SELECT_BY_ID, params![ids[3]], book_from_row)
            .unwrap();
        assert_eq!(book.id, Some(ids[3]));
        assert_eq!(Book { id: None, ..book }, new_book());
    }

    #[test]
    fn test_page_sweep_after_earlier_rows() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(CREATE_BOOKS, []).unwrap();
        seed_books(&conn, 1000, 500).unwrap();
        conn.execute("DELETE FROM books", []).unwrap();
        let seeded = seed_books(&conn, 300, 500).unwrap();
        assert_eq!(seeded[0], 1001);

        let mut stmt = conn.prepare(SELECT_PAGE).unwrap();
        let mut swept = Vec::new();
        for offset in page_offsets(300, 100) {
            let page = read_page(&mut stmt, offset, 100).unwrap();
            assert_eq!(page.len(), 100);
            swept.extend(page.iter().map(|b| b.id.unwrap()));
        }
        assert_eq!(swept, seeded);
    }

    #[test]
    fn test_first_error_keeps_the_first() {
        let steps = vec![Ok(1), Err("a"), Ok(2), Err("b")];
        assert_eq!(first_error(steps.into_iter()), Err("a"));

        let steps: Vec<Result<i32, &str>> = vec![Ok(1), Ok(2)];
        assert_eq!(first_error(steps.into_iter()), Ok(()));
    }
}
