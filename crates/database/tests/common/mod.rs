#![allow(dead_code)]

use chrono::NaiveDate;
use core_types::{LoanPeriod, NewBook, NewMember};
use database::{DbRepository, LoanLedger};
use sqlx::PgPool;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn today() -> NaiveDate {
    date(2024, 6, 1)
}

pub fn services(pool: &PgPool) -> (DbRepository, LoanLedger) {
    (
        DbRepository::new(pool.clone()),
        LoanLedger::new(pool.clone(), LoanPeriod::default()),
    )
}

pub async fn add_dune(repo: &DbRepository, copies: u32) -> i32 {
    let book = NewBook::parse(
        "Dune",
        "9780441013593",
        "1965",
        "Sci-Fi",
        "Frank Herbert",
        &copies.to_string(),
    )
    .unwrap();
    repo.add_book_title(&book).await.unwrap()
}

pub async fn add_member(repo: &DbRepository, name: &str) -> i32 {
    let member = NewMember::parse(name, "1 Library Lane", "555-0100").unwrap();
    repo.register_member(&member).await.unwrap()
}

/// Row counts of every table, used to show an operation wrote nothing.
pub async fn table_counts(pool: &PgPool) -> Vec<i64> {
    let mut counts = Vec::new();
    for table in ["author", "book", "bookcopy", "member", "loan"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap();
        counts.push(count);
    }
    counts
}

pub async fn on_loan_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM bookcopy WHERE status = 'On Loan'")
        .fetch_one(pool)
        .await
        .unwrap()
}
