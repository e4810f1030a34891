//! Unit-of-work style: every operation runs inside its own explicit
//! transaction, and bulk inserts are row-by-row inside one transaction.

use rusqlite::Connection;

use crate::backend::{Backend, BenchConfig};
use crate::conf::WorkloadConfig;
use crate::core::BenchError;
use crate::fixture::{Book, new_book, new_books, reset_identity};
use crate::measure::Measure;

use super::{
    DELETE_BOOK, INSERT_BOOK, SELECT_BY_ID, SELECT_PAGE, UPDATE_BOOK, book_from_row, book_params,
    check, first_error, not_initialized, page_offsets, read_page, seed_books, seed_one,
    update_params,
};

pub struct TxBackend {
    conn: Option<Connection>,
    workload: WorkloadConfig,
}

impl TxBackend {
    pub const NAME: &'static str = "rusqlite-tx";

    pub fn new() -> Self {
        Self {
            conn: None,
            workload: WorkloadConfig::default(),
        }
    }
}

impl Default for TxBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_rows(conn: &Connection, books: &mut [Book]) -> Result<(), BenchError> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare_cached(INSERT_BOOK)?;
        for book in books.iter_mut() {
            stmt.execute(&book_params(book)[..])?;
            book.id = Some(tx.last_insert_rowid());
        }
    }
    tx.commit()?;
    Ok(())
}

fn update_row(conn: &Connection, book: &Book, id: i64) -> Result<(), BenchError> {
    let tx = conn.unchecked_transaction()?;
    tx.prepare_cached(UPDATE_BOOK)?
        .execute(&update_params(book, &id)[..])?;
    tx.commit()?;
    Ok(())
}

fn delete_row(conn: &Connection, id: i64) -> Result<(), BenchError> {
    let tx = conn.unchecked_transaction()?;
    tx.prepare_cached(DELETE_BOOK)?.execute([id])?;
    tx.commit()?;
    Ok(())
}

fn find_row(conn: &Connection, id: i64) -> Result<Book, BenchError> {
    let tx = conn.unchecked_transaction()?;
    let book = tx
        .prepare_cached(SELECT_BY_ID)?
        .query_row([id], book_from_row)?;
    tx.commit()?;
    Ok(book)
}

fn select_page(conn: &Connection, offset: i64, size: usize) -> Result<Vec<Book>, BenchError> {
    let tx = conn.unchecked_transaction()?;
    let page = read_page(&mut *tx.prepare_cached(SELECT_PAGE)?, offset, size)?;
    tx.commit()?;
    Ok(page)
}

impl Backend for TxBackend {
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
        let mut book = [new_book()];
        m.reset();

        for _ in 0..m.iterations() {
            m.pause();
            reset_identity(&mut book);
            m.resume();

            check(m, insert_rows(conn, &mut book));
        }
    }

    fn insert_bulk(&mut self, m: &mut dyn Measure) {
        let Some(conn) = self.conn.as_ref() else {
            return not_initialized(m, Self::NAME);
        };
        let mut books = new_books(self.workload.bulk_insert_rows);
        m.reset();

        for _ in 0..m.iterations() {
            m.pause();
            reset_identity(&mut books);
            m.resume();

            check(m, insert_rows(conn, &mut books));
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
            check(m, update_row(conn, &book, id));
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
            check(m, delete_row(conn, id));
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
            check(m, first_error((0..lookups).map(|_| find_row(conn, id))));
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
