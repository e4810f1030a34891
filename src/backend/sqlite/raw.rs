//! Ad-hoc statements: every call prepares its SQL from scratch.

use rusqlite::Connection;

use crate::backend::{Backend, BenchConfig};
use crate::conf::WorkloadConfig;
use crate::core::BenchError;
use crate::fixture::{Book, chunk, new_book, new_books, reset_identity};
use crate::measure::Measure;

use super::{
    DELETE_BOOK, INSERT_BOOK, SELECT_BY_ID, SELECT_PAGE, UPDATE_BOOK, book_from_row, book_params,
    bulk_insert_sql, bulk_params, check, first_error, not_initialized, page_offsets, read_page,
    seed_books, seed_one, update_params,
};

pub struct RawBackend {
    conn: Option<Connection>,
    workload: WorkloadConfig,
}

impl RawBackend {
    pub const NAME: &'static str = "rusqlite";

    pub fn new() -> Self {
        Self {
            conn: None,
            workload: WorkloadConfig::default(),
        }
    }
}

impl Default for RawBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the statement text on every call, like hand-written SQL would.
fn insert_bulk(conn: &Connection, books: &[Book], batch_size: usize) -> Result<(), BenchError> {
    for batch in chunk(books, batch_size) {
        let sql = bulk_insert_sql(batch.len(), false);
        conn.execute(&sql, &bulk_params(batch)[..])?;
    }
    Ok(())
}

fn select_page(conn: &Connection, offset: i64, size: usize) -> Result<Vec<Book>, BenchError> {
    read_page(&mut conn.prepare(SELECT_PAGE)?, offset, size)
}

impl Backend for RawBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&mut self, config: &BenchConfig) -> Result<(), BenchError> {
        self.workload = config.workload.clone();
        self.conn = Some(super::open(config)?);
        Ok(())
    }

    fn close(&mut self) -> Result<(), BenchError> {
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

            let result = conn.execute(INSERT_BOOK, &book_params(&book)[..]);
            if check(m, result).is_some() {
                book.id = Some(conn.last_insert_rowid());
            }
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

            check(m, insert_bulk(conn, &books, batch_size));
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
            check(m, conn.execute(UPDATE_BOOK, &update_params(&book, &id)[..]));
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
            check(m, conn.execute(DELETE_BOOK, [id]));
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
            let found = (0..lookups).map(|_| conn.query_row(SELECT_BY_ID, [id], book_from_row));
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
