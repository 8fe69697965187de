use crate::enums::CopyStatus;
use crate::error::CoreError;
use crate::validation;
use chrono::{Days, NaiveDate};
use sqlx::FromRow;

/// A row from the `author` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Author {
    pub author_id: i32,
    pub author_name: String,
}

/// A row from the `bookcopy` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct BookCopy {
    pub copy_id: i32,
    pub book_id: i32,
    #[sqlx(try_from = "String")]
    pub status: CopyStatus,
}

/// A row from the `loan` table. Open while `date_returned` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Loan {
    pub loan_id: i32,
    pub copy_id: i32,
    pub member_id: i32,
    pub date_borrowed: NaiveDate,
    pub due_date: NaiveDate,
    pub date_returned: Option<NaiveDate>,
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.date_returned.is_none()
    }

    /// An open loan is overdue once its due date lies strictly before `as_of`.
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        self.is_open() && self.due_date < as_of
    }
}

/// The fixed number of days a copy may be borrowed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanPeriod {
    days: u32,
}

impl LoanPeriod {
    pub const DEFAULT_DAYS: u32 = 21;

    pub fn new(days: u32) -> Result<Self, CoreError> {
        if days == 0 {
            return Err(CoreError::InvalidInput(
                "loan period".to_string(),
                "must be at least one day".to_string(),
            ));
        }
        Ok(Self { days })
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// Due date for a loan starting on `borrowed`.
    pub fn due_date(&self, borrowed: NaiveDate) -> Result<NaiveDate, CoreError> {
        borrowed
            .checked_add_days(Days::new(u64::from(self.days)))
            .ok_or_else(|| {
                CoreError::InvalidInput(
                    "borrow date".to_string(),
                    format!("{borrowed} plus {} days is out of range", self.days),
                )
            })
    }
}

impl Default for LoanPeriod {
    fn default() -> Self {
        Self {
            days: Self::DEFAULT_DAYS,
        }
    }
}

/// A validated request to add a title together with its first copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub genre: Option<String>,
    pub author_name: String,
    pub copies: u32,
}

impl NewBook {
    /// Builds a `NewBook` from the raw answers typed at the terminal.
    pub fn parse(
        title: &str,
        isbn: &str,
        year: &str,
        genre: &str,
        author_name: &str,
        copies: &str,
    ) -> Result<Self, CoreError> {
        let book = Self {
            title: validation::required("title", title)?,
            isbn: validation::normalize_isbn(isbn)?,
            publication_year: validation::parse_year(year)?,
            genre: validation::optional(genre),
            author_name: validation::required("author name", &validation::normalize_name(author_name))?,
            copies: validation::parse_copy_count(copies)?,
        };
        Ok(book)
    }

    /// Re-checks the invariants for values built without `parse`.
    pub fn validate(&self) -> Result<(), CoreError> {
        validation::required("title", &self.title)?;
        validation::required("author name", &self.author_name)?;
        if self.copies == 0 {
            return Err(CoreError::InvalidInput(
                "number of copies".to_string(),
                "please enter a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

/// A validated member registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub name: String,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

impl NewMember {
    pub fn parse(name: &str, address: &str, phone: &str) -> Result<Self, CoreError> {
        Ok(Self {
            name: validation::required("member name", name)?,
            address: validation::optional(address),
            phone_number: validation::optional(phone),
        })
    }
}

/// One line of the search results: a title with its inventory counts.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct BookSummary {
    pub book_id: i32,
    pub title: String,
    pub author_name: String,
    pub total_copies: i64,
    pub available_copies: i64,
}

/// An open loan whose due date has passed.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct OverdueLoan {
    pub loan_id: i32,
    pub copy_id: i32,
    pub title: String,
    pub member_id: i32,
    pub member_name: String,
    pub due_date: NaiveDate,
}

impl OverdueLoan {
    pub fn days_overdue(&self, as_of: NaiveDate) -> i64 {
        (as_of - self.due_date).num_days()
    }
}

/// What a successful checkout hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    pub loan_id: i32,
    pub copy_id: i32,
    pub member_id: i32,
    pub date_borrowed: NaiveDate,
    pub due_date: NaiveDate,
}

/// What a successful return hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnReceipt {
    pub loan_id: i32,
    pub copy_id: i32,
    pub date_returned: NaiveDate,
}

/// A copy whose status disagrees with its number of open loans.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CopyDiscrepancy {
    pub copy_id: i32,
    #[sqlx(try_from = "String")]
    pub status: CopyStatus,
    pub open_loans: i64,
}
