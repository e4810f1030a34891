//! Prepared statements kept in the connection's statement cache, with
//! generated identities read back through `RETURNING`.

use rusqlite::Connection;

use crate::backend::{Backend, BenchConfig};
use crate::conf::WorkloadConfig;
use crate::core::BenchError;
use crate::fixture::{Book, new_book, new_books, reset_identity};
use crate::measure::Measure;

use super::{
    DELETE_BOOK, INSERT_BOOK_RETURNING, SELECT_BY_ID, SELECT_PAGE, UPDATE_BOOK, book_from_row,
    book_params, bulk_insert_sql, bulk_params, check, first_error, not_initialized, page_offsets,
    read_page, seed_books, seed_one, update_params,
};

const STATEMENT_CACHE_CAPACITY: usize = 32;

pub struct CachedBackend {
    conn: Option<Connection>,
    workload: WorkloadConfig,
}

impl CachedBackend {
    pub const NAME: &'static str = "rusqlite-cached";

    pub fn new() -> Self {
        Self {
            conn: None,
            workload: WorkloadConfig::default(),
        }
    }
}

impl Default for CachedBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_one(conn: &Connection, book: &mut Book) -> Result<(), BenchError> {
    let mut stmt = conn.prepare_cached(INSERT_BOOK_RETURNING)?;
    let id: i64 = stmt.query_row(&book_params(book)[..], |row| row.get(0))?;
    book.id = Some(id);
    Ok(())
}

/// Multi-row inserts, one cached statement per distinct batch length.
fn insert_bulk(conn: &Connection, books: &mut [Book], batch_size: usize) -> Result<(), BenchError> {
    for batch in books.chunks_mut(batch_size.max(1)) {
        let sql = bulk_insert_sql(batch.len(), true);
        let mut stmt = conn.prepare_cached(&sql)?;
        let ids: Vec<i64> = stmt
            .query_map(&bulk_params(batch)[..], |row| row.get(0))?
            .collect::<Result<_, _>>()?;
        for (book, id) in batch.iter_mut().zip(ids) {
            book.id = Some(id);
        }
    }
    Ok(())
}

fn select_page(conn: &Connection, offset: i64, size: usize) -> Result<Vec<Book>, BenchError> {
    read_page(&mut *conn.prepare_cached(SELECT_PAGE)?, offset, size)
}

impl Backend for CachedBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, config: &BenchConfig) -> Result<(), BenchError> {
        let conn = super::open(config)?;
        conn.set_prepared_statement_cache_capacity(STATEMENT_CACHE_CAPACITY);
        self.workload = config.workload.clone();
        self.conn = Some(conn);
        Ok(())
    }

    fn close(&mut self) -> Result<(), BenchError> {
        if let Some(conn) = self.conn.as_ref() {
            conn.flush_prepared_statement_cache();
        }
        super::close(self.conn.take())
    }

    fn insert(&mut self, m: &mut dyn Measure) {
        let Some(conn) = self.conn.as_ref() else {
            return not_initialized(m, Self::NAME);
        };
        let mut book = new_book();
        m.reset();

        for _ in 0..m.iterations() {
            m.pause();
            book.id = None;
            m.resume();

            check(m, insert_one(conn, &mut book));
        }
    }

    fn insert_bulk(&mut self, m: &mut dyn Measure) {
        let Some(conn) = self.conn.as_ref() else {
            return not_initialized(m, Self::NAME);
        };
        let mut books = new_books(self.workload.bulk_insert_rows);
        let batch_size = self.workload.seed_batch_size;
        m.reset();

        for _ in 0..m.iterations() {
            m.pause();
            reset_identity(&mut books);
            m.resume();

            check(m, insert_bulk(conn, &mut books, batch_size));
        }
    }

    fn update(&mut self, m: &mut dyn Measure) {
        let Some(conn) = self.conn.as_ref() else {
            return not_initialized(m, Self::NAME);
        };
        let book = new_book();
        let Some(id) = check(m, seed_one(conn)) else {
            return;
        };
        m.reset();

        for _ in 0..m.iterations() {
            let result = conn
                .prepare_cached(UPDATE_BOOK)
                .and_then(|mut stmt| stmt.execute(&update_params(&book, &id)[..]));
            check(m, result);
        }
    }

    fn delete(&mut self, m: &mut dyn Measure) {
        let Some(conn) = self.conn.as_ref() else {
            return not_initialized(m, Self::NAME);
        };
        let n = m.iterations() as usize;
        let Some(ids) = check(m, seed_books(conn, n, self.workload.seed_batch_size)) else {
            return;
        };
        m.reset();

        for id in ids {
            let result = conn
                .prepare_cached(DELETE_BOOK)
                .and_then(|mut stmt| stmt.execute([id]));
            check(m, result);
        }
    }

    fn find_by_id(&mut self, m: &mut dyn Measure) {
        let Some(conn) = self.conn.as_ref() else {
            return not_initialized(m, Self::NAME);
        };
        let Some(id) = check(m, seed_one(conn)) else {
            return;
        };
        let lookups = self.workload.find_one_loop;
        m.reset();

        for _ in 0..m.iterations() {
            let found = (0..lookups).map(|_| {
                conn.prepare_cached(SELECT_BY_ID)
                    .and_then(|mut stmt| stmt.query_row([id], book_from_row))
            });
            check(m, first_error(found));
        }
    }

    fn find_page(&mut self, m: &mut dyn Measure) {
        let Some(conn) = self.conn.as_ref() else {
            return not_initialized(m, Self::NAME);
        };
        let rows = self.workload.page_rows;
        let size = self.workload.page_size;
        if check(m, seed_books(conn, rows, self.workload.seed_batch_size)).is_none() {
            return;
        }
        m.reset();

        for _ in 0..m.iterations() {
            let pages = page_offsets(rows, size).map(|offset| select_page(conn, offset, size));
            check(m, first_error(pages));
        }
    }
}
