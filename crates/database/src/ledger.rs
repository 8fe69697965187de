//! The loan ledger: the only code that moves a copy between Available and
//! On Loan.
//!
//! Both transitions touch two rows (the copy's status and a loan record) and
//! run inside one transaction. Returning early with `?` drops the transaction
//! uncommitted, which rolls back whatever was already written.
//!
//! Invariant: a copy is On Loan exactly when it has one loan whose
//! `date_returned` is NULL. [`LoanLedger::audit`] reports every copy that
//! breaks it.

use crate::DbError;
use chrono::NaiveDate;
use core_types::{CheckoutReceipt, CopyDiscrepancy, CopyStatus, LoanPeriod, ReturnReceipt};
use sqlx::postgres::PgPool;

#[derive(Debug, Clone)]
pub struct LoanLedger {
    pool: PgPool,
    period: LoanPeriod,
}

impl LoanLedger {
    pub fn new(pool: PgPool, period: LoanPeriod) -> Self {
        Self { pool, period }
    }

    /// Lends one Available copy of `title` to `member_id`, starting on `today`.
    ///
    /// Which copy is picked among several Available ones is unspecified. The
    /// candidate row is locked (`SKIP LOCKED`), and the status flip only
    /// applies while the copy is still Available, so two concurrent
    /// checkouts can never take the same copy.
    pub async fn checkout(
        &self,
        member_id: i32,
        title: &str,
        today: NaiveDate,
    ) -> Result<CheckoutReceipt, DbError> {
        let due_date = self.period.due_date(today)?;

        let mut tx = self.pool.begin().await?;

        let candidate: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT bc.copy_id
            FROM bookcopy bc
            JOIN book b ON b.book_id = bc.book_id
            WHERE b.title = $1
              AND bc.status = $2
            ORDER BY bc.copy_id
            LIMIT 1
            FOR UPDATE OF bc SKIP LOCKED
            "#,
        )
        .bind(title)
        .bind(CopyStatus::Available.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(copy_id) = candidate else {
            tracing::warn!(member_id, title, "Checkout refused: no available copy.");
            return Err(DbError::NoAvailableCopy(title.to_string()));
        };

        let next = CopyStatus::Available.check_out()?;
        let flipped = sqlx::query("UPDATE bookcopy SET status = $1 WHERE copy_id = $2 AND status = $3")
            .bind(next.as_str())
            .bind(copy_id)
            .bind(CopyStatus::Available.as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if flipped != 1 {
            tracing::warn!(copy_id, title, "Checkout lost the race for the selected copy.");
            return Err(DbError::NoAvailableCopy(title.to_string()));
        }

        let loan_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO loan (copy_id, member_id, date_borrowed, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING loan_id
            "#,
        )
        .bind(copy_id)
        .bind(member_id)
        .bind(today)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unknown_member(e, member_id))?;

        tx.commit().await?;

        tracing::info!(loan_id, copy_id, member_id, %due_date, "Copy checked out.");
        Ok(CheckoutReceipt {
            loan_id,
            copy_id,
            member_id,
            date_borrowed: today,
            due_date,
        })
    }

    /// Closes the open loan on `copy_id` as of `today` and makes the copy
    /// Available again.
    ///
    /// Fails with [`DbError::NoOpenLoan`] (and writes nothing) when the copy
    /// was never lent out or has already been returned.
    pub async fn return_copy(&self, copy_id: i32, today: NaiveDate) -> Result<ReturnReceipt, DbError> {
        let mut tx = self.pool.begin().await?;

        let loan_id: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE loan
            SET date_returned = $1
            WHERE copy_id = $2
              AND date_returned IS NULL
            RETURNING loan_id
            "#,
        )
        .bind(today)
        .bind(copy_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(loan_id) = loan_id else {
            tracing::warn!(copy_id, "Return refused: no active loan.");
            return Err(DbError::NoOpenLoan(copy_id));
        };

        let next = CopyStatus::OnLoan.check_in()?;
        let flipped = sqlx::query("UPDATE bookcopy SET status = $1 WHERE copy_id = $2 AND status = $3")
            .bind(next.as_str())
            .bind(copy_id)
            .bind(CopyStatus::OnLoan.as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if flipped != 1 {
            tracing::error!(copy_id, loan_id, "Open loan found for a copy that is not on loan; rolling back.");
            return Err(DbError::InconsistentCopy(copy_id));
        }

        tx.commit().await?;

        tracing::info!(loan_id, copy_id, date_returned = %today, "Copy returned.");
        Ok(ReturnReceipt {
            loan_id,
            copy_id,
            date_returned: today,
        })
    }

    /// Every copy whose status disagrees with its number of open loans.
    /// Empty while the ledger invariant holds.
    pub async fn audit(&self) -> Result<Vec<CopyDiscrepancy>, DbError> {
        let rows = sqlx::query_as::<_, CopyDiscrepancy>(
            r#"
            SELECT
                bc.copy_id,
                bc.status,
                COUNT(l.loan_id) AS open_loans
            FROM bookcopy bc
            LEFT JOIN loan l ON l.copy_id = bc.copy_id AND l.date_returned IS NULL
            GROUP BY bc.copy_id, bc.status
            HAVING (bc.status = $1) <> (COUNT(l.loan_id) = 1)
            ORDER BY bc.copy_id
            "#,
        )
        .bind(CopyStatus::OnLoan.as_str())
        .fetch_all(&self.pool)
        .await?;

        if !rows.is_empty() {
            tracing::error!(copies = rows.len(), "Ledger audit found inconsistent copies.");
        }
        Ok(rows)
    }
}

/// A loan row that references a missing member fails its foreign key; report
/// that as a missing member rather than a raw driver error.
fn unknown_member(error: sqlx::Error, member_id: i32) -> DbError {
    match &error {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            tracing::warn!(member_id, "Checkout refused: unknown member.");
            DbError::NotFound(format!("member {member_id}"))
        }
        _ => error.into(),
    }
}
