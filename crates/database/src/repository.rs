use crate::DbError;
use chrono::NaiveDate;
use core_types::{
    validation, Author, BookCopy, BookSummary, CopyStatus, CoreError, Loan, NewBook, NewMember,
    OverdueLoan,
};
use sqlx::postgres::{PgConnection, PgPool};

/// The `DbRepository` provides a high-level, application-specific interface
/// to the catalogue and membership tables. It encapsulates all SQL queries
/// that do not move a copy between states; those live in [`crate::LoanLedger`].
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Adds a title and its first copies in a single transaction.
    ///
    /// The author is looked up by (normalised) name and created if missing.
    /// Returns the new `book_id`.
    pub async fn add_book_title(&self, book: &NewBook) -> Result<i32, DbError> {
        book.validate()?;

        let author_name = validation::normalize_name(&book.author_name);

        let mut tx = self.pool.begin().await?;

        let author_id = find_or_create_author(&mut *tx, &author_name).await?;

        let book_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO book (title, isbn, publication_year, genre, author_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING book_id
            "#,
        )
        .bind(&book.title)
        .bind(book.isbn.as_deref())
        .bind(book.publication_year)
        .bind(book.genre.as_deref())
        .bind(author_id)
        .fetch_one(&mut *tx)
        .await?;

        insert_copies(&mut *tx, book_id, book.copies).await?;

        tx.commit().await?;
        tracing::info!(book_id, author_id, copies = book.copies, title = %book.title, "Added book title.");
        Ok(book_id)
    }

    /// Adds `copies` new Available copies to an existing title.
    pub async fn restock(&self, book_id: i32, copies: u32) -> Result<u64, DbError> {
        if copies == 0 {
            return Err(CoreError::InvalidInput(
                "number of copies".to_string(),
                "please enter a positive integer".to_string(),
            )
            .into());
        }

        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM book WHERE book_id = $1)")
            .bind(book_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(DbError::NotFound(format!("book {book_id}")));
        }

        let added = insert_copies(&mut *tx, book_id, copies).await?;

        tx.commit().await?;
        tracing::info!(book_id, copies = added, "Restocked book title.");
        Ok(added)
    }

    /// Registers a new member. Always creates a new row, even for a repeated name.
    pub async fn register_member(&self, member: &NewMember) -> Result<i32, DbError> {
        let member_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO member (member_name, address, phone_number)
            VALUES ($1, $2, $3)
            RETURNING member_id
            "#,
        )
        .bind(&member.name)
        .bind(member.address.as_deref())
        .bind(member.phone_number.as_deref())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(member_id, "Registered member.");
        Ok(member_id)
    }

    /// Case-insensitive substring search over titles and author names, with
    /// inventory counts per title, ordered by title.
    pub async fn search_books(&self, term: &str) -> Result<Vec<BookSummary>, DbError> {
        let pattern = like_pattern(term);
        let rows = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT
                b.book_id,
                b.title,
                a.author_name,
                COUNT(bc.copy_id) AS total_copies,
                COUNT(bc.copy_id) FILTER (WHERE bc.status = $2) AS available_copies
            FROM book b
            JOIN author a ON a.author_id = b.author_id
            LEFT JOIN bookcopy bc ON bc.book_id = b.book_id
            WHERE LOWER(b.title) LIKE LOWER($1) ESCAPE '\'
               OR LOWER(a.author_name) LIKE LOWER($1) ESCAPE '\'
            GROUP BY b.book_id, b.title, a.author_name
            ORDER BY b.title, b.book_id
            "#,
        )
        .bind(pattern)
        .bind(CopyStatus::Available.as_str())
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(term, matches = rows.len(), "Searched books.");
        Ok(rows)
    }

    /// Open loans whose due date lies strictly before `as_of`, oldest due date first.
    pub async fn overdue_report(&self, as_of: NaiveDate) -> Result<Vec<OverdueLoan>, DbError> {
        let rows = sqlx::query_as::<_, OverdueLoan>(
            r#"
            SELECT
                l.loan_id,
                l.copy_id,
                b.title,
                m.member_id,
                m.member_name,
                l.due_date
            FROM loan l
            JOIN bookcopy bc ON bc.copy_id = l.copy_id
            JOIN book b ON b.book_id = bc.book_id
            JOIN member m ON m.member_id = l.member_id
            WHERE l.date_returned IS NULL
              AND l.due_date < $1
            ORDER BY l.due_date ASC, l.loan_id ASC
            "#,
        )
        .bind(as_of)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_author_by_name(&self, name: &str) -> Result<Option<Author>, DbError> {
        let author = sqlx::query_as::<_, Author>(
            "SELECT author_id, author_name FROM author WHERE author_name = $1",
        )
        .bind(validation::normalize_name(name))
        .fetch_optional(&self.pool)
        .await?;
        Ok(author)
    }

    pub async fn get_copy(&self, copy_id: i32) -> Result<BookCopy, DbError> {
        sqlx::query_as::<_, BookCopy>("SELECT copy_id, book_id, status FROM bookcopy WHERE copy_id = $1")
            .bind(copy_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("copy {copy_id}")))
    }

    pub async fn get_copies_for_book(&self, book_id: i32) -> Result<Vec<BookCopy>, DbError> {
        let copies = sqlx::query_as::<_, BookCopy>(
            "SELECT copy_id, book_id, status FROM bookcopy WHERE book_id = $1 ORDER BY copy_id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(copies)
    }

    /// Full loan history of a copy, oldest first.
    pub async fn get_loans_for_copy(&self, copy_id: i32) -> Result<Vec<Loan>, DbError> {
        let loans = sqlx::query_as::<_, Loan>(
            r#"
            SELECT loan_id, copy_id, member_id, date_borrowed, due_date, date_returned
            FROM loan
            WHERE copy_id = $1
            ORDER BY loan_id
            "#,
        )
        .bind(copy_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }
}

/// Returns the id of the author called `name`, inserting the author first if needed.
async fn find_or_create_author(conn: &mut PgConnection, name: &str) -> Result<i32, DbError> {
    let inserted: Option<i32> = sqlx::query_scalar(
        r#"
        INSERT INTO author (author_name) VALUES ($1)
        ON CONFLICT (author_name) DO NOTHING
        RETURNING author_id
        "#,
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(author_id) = inserted {
        tracing::debug!(author_id, name, "Created author.");
        return Ok(author_id);
    }

    let author_id = sqlx::query_scalar("SELECT author_id FROM author WHERE author_name = $1")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    Ok(author_id)
}

/// Inserts `count` Available copies of `book_id` in one statement.
async fn insert_copies(conn: &mut PgConnection, book_id: i32, count: u32) -> Result<u64, DbError> {
    let count = i32::try_from(count).map_err(|_| {
        CoreError::InvalidInput(
            "number of copies".to_string(),
            format!("{count} is too many copies to add at once"),
        )
    })?;

    let result = sqlx::query(
        r#"
        INSERT INTO bookcopy (book_id, status)
        SELECT $1, $2 FROM generate_series(1, $3)
        "#,
    )
    .bind(book_id)
    .bind(CopyStatus::Available.as_str())
    .bind(count)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Wraps `term` for a literal substring match with `LIKE ... ESCAPE '\'`.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_term() {
        assert_eq!(like_pattern("dune"), "%dune%");
        assert_eq!(like_pattern("  Herbert "), "%Herbert%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\"), "%c:\\\\%");
    }
}
