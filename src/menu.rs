//! The interactive numbered menu.
//!
//! Each option reads its answers, validates them before touching the
//! database, runs one operation and prints the outcome. Failures are printed
//! and logged; the loop always regains control. End of input exits like
//! option 7.

use crate::error::AppError;
use crate::render;
use chrono::{Local, NaiveDate};
use core_types::{validation, NewBook, NewMember};
use database::{DbRepository, LoanLedger};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    AddBook,
    AddMember,
    Search,
    Checkout,
    Return,
    Overdue,
    Exit,
}

const CHOICES: [(&str, &str, Choice); 7] = [
    ("1", "Add new book & copies", Choice::AddBook),
    ("2", "Register new member", Choice::AddMember),
    ("3", "Search books", Choice::Search),
    ("4", "Check out a book copy", Choice::Checkout),
    ("5", "Return a book copy", Choice::Return),
    ("6", "Overdue report", Choice::Overdue),
    ("7", "Exit", Choice::Exit),
];

fn parse_choice(raw: &str) -> Option<Choice> {
    let raw = raw.trim();
    CHOICES
        .iter()
        .find(|(key, _, _)| *key == raw)
        .map(|(_, _, choice)| *choice)
}

pub struct Menu<'a, R, W> {
    repo: &'a DbRepository,
    ledger: &'a LoanLedger,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(repo: &'a DbRepository, ledger: &'a LoanLedger, input: R, output: W) -> Self {
        Self {
            repo,
            ledger,
            input,
            output,
        }
    }

    /// Runs until the user picks Exit or input ends.
    pub async fn run(&mut self) -> Result<(), AppError> {
        loop {
            self.print_menu()?;
            let choice = match self.prompt("Choose an option: ") {
                Ok(answer) => answer,
                Err(AppError::EndOfInput) => break,
                Err(e) => return Err(e),
            };

            let Some(choice) = parse_choice(&choice) else {
                writeln!(self.output, "Invalid choice; please enter 1-7.")?;
                continue;
            };
            if choice == Choice::Exit {
                break;
            }

            match self.dispatch(choice).await {
                Ok(()) => {}
                Err(AppError::EndOfInput) => break,
                Err(AppError::Io(e)) => return Err(AppError::Io(e)),
                Err(e) => {
                    e.log(&format!("{choice:?}"));
                    writeln!(self.output, "Error: {e}")?;
                }
            }
        }
        writeln!(self.output, "Goodbye.")?;
        Ok(())
    }

    fn print_menu(&mut self) -> Result<(), AppError> {
        writeln!(self.output)?;
        writeln!(self.output, "Library Management CLI")?;
        writeln!(self.output, "{}", "-".repeat(25))?;
        for (key, label, _) in CHOICES {
            writeln!(self.output, "{key}. {label}")?;
        }
        Ok(())
    }

    /// Prints `label` and reads one line. Returns the line without its terminator.
    fn prompt(&mut self, label: &str) -> Result<String, AppError> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(AppError::EndOfInput);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    async fn dispatch(&mut self, choice: Choice) -> Result<(), AppError> {
        let today = Local::now().date_naive();
        match choice {
            Choice::AddBook => self.add_book().await,
            Choice::AddMember => self.add_member().await,
            Choice::Search => self.search_books().await,
            Choice::Checkout => self.checkout(today).await,
            Choice::Return => self.return_copy(today).await,
            Choice::Overdue => self.overdue_report(today).await,
            Choice::Exit => Ok(()),
        }
    }

    async fn add_book(&mut self) -> Result<(), AppError> {
        let title = self.prompt("Book title: ")?;
        let isbn = self.prompt("ISBN (13 chars): ")?;
        let year = self.prompt("Publication year (YYYY): ")?;
        let genre = self.prompt("Genre: ")?;
        let author = self.prompt("Author name: ")?;
        let copies = self.prompt("Number of copies to add: ")?;

        let book = NewBook::parse(&title, &isbn, &year, &genre, &author, &copies)?;
        let book_id = self.repo.add_book_title(&book).await?;
        writeln!(
            self.output,
            "Success: '{}' added with {} copies (book ID {book_id}).",
            book.title, book.copies
        )?;
        Ok(())
    }

    async fn add_member(&mut self) -> Result<(), AppError> {
        let name = self.prompt("Member name: ")?;
        let address = self.prompt("Address: ")?;
        let phone = self.prompt("Phone number: ")?;

        let member = NewMember::parse(&name, &address, &phone)?;
        let member_id = self.repo.register_member(&member).await?;
        writeln!(
            self.output,
            "Success: Member '{}' registered (ID {member_id}).",
            member.name
        )?;
        Ok(())
    }

    async fn search_books(&mut self) -> Result<(), AppError> {
        let term = self.prompt("Search term (title or author): ")?;
        let rows = self.repo.search_books(&term).await?;
        if rows.is_empty() {
            writeln!(self.output, "No matches found.")?;
        } else {
            writeln!(self.output, "{}", render::books_table(&rows))?;
        }
        Ok(())
    }

    async fn checkout(&mut self, today: NaiveDate) -> Result<(), AppError> {
        let member_id = validation::parse_id("member ID", &self.prompt("Member ID: ")?)?;
        let title = validation::required("title", &self.prompt("Book title to check out: ")?)?;

        let receipt = self.ledger.checkout(member_id, &title, today).await?;
        writeln!(
            self.output,
            "Checkout successful: copy {} due on {}.",
            receipt.copy_id, receipt.due_date
        )?;
        Ok(())
    }

    async fn return_copy(&mut self, today: NaiveDate) -> Result<(), AppError> {
        let copy_id = validation::parse_id("copy ID", &self.prompt("Copy ID to return: ")?)?;

        let receipt = self.ledger.return_copy(copy_id, today).await?;
        writeln!(
            self.output,
            "Return processed: copy {} is now available.",
            receipt.copy_id
        )?;
        Ok(())
    }

    async fn overdue_report(&mut self, today: NaiveDate) -> Result<(), AppError> {
        let rows = self.repo.overdue_report(today).await?;
        if rows.is_empty() {
            writeln!(self.output, "No overdue loans.")?;
        } else {
            writeln!(self.output, "{}", render::overdue_table(&rows, today))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::LoanPeriod;
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

    /// A pool that never connects: every test below fails or exits before
    /// any query would run.
    fn offline_services() -> (DbRepository, LoanLedger) {
        let options = PgConnectOptions::new()
            .host("127.0.0.1")
            .port(1)
            .database("unused");
        let pool = PgPoolOptions::new().connect_lazy_with(options);
        (
            DbRepository::new(pool.clone()),
            LoanLedger::new(pool, LoanPeriod::default()),
        )
    }

    async fn run_script(script: &str) -> String {
        let (repo, ledger) = offline_services();
        let mut output = Vec::new();
        Menu::new(&repo, &ledger, script.as_bytes(), &mut output)
            .run()
            .await
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn choices_map_to_menu_numbers() {
        assert_eq!(parse_choice("1"), Some(Choice::AddBook));
        assert_eq!(parse_choice(" 4 "), Some(Choice::Checkout));
        assert_eq!(parse_choice("7"), Some(Choice::Exit));
        assert_eq!(parse_choice("8"), None);
        assert_eq!(parse_choice(""), None);
    }

    #[tokio::test]
    async fn exit_says_goodbye() {
        let output = run_script("7\n").await;
        assert!(output.contains("1. Add new book & copies"));
        assert!(output.contains("7. Exit"));
        assert!(output.ends_with("Goodbye.\n"));
    }

    #[tokio::test]
    async fn end_of_input_exits_cleanly() {
        let output = run_script("").await;
        assert!(output.ends_with("Goodbye.\n"));
    }

    #[tokio::test]
    async fn invalid_choice_reprompts() {
        let output = run_script("9\nhello\n7\n").await;
        assert_eq!(output.matches("Invalid choice; please enter 1-7.").count(), 2);
        assert_eq!(output.matches("Library Management CLI").count(), 3);
    }

    #[tokio::test]
    async fn bad_member_id_is_rejected_before_the_database() {
        let output = run_script("4\nabc\n7\n").await;
        assert!(output.contains("Error: Invalid input for member ID"));
        // The title prompt is never reached.
        assert!(!output.contains("Book title to check out"));
        assert!(output.ends_with("Goodbye.\n"));
    }

    #[tokio::test]
    async fn non_positive_copy_count_is_rejected() {
        let output = run_script("1\nDune\n9780441013593\n1965\nSci-Fi\nFrank Herbert\n0\n7\n").await;
        assert!(output.contains("Error: Invalid input for number of copies"));
        assert!(!output.contains("Success"));
    }

    #[tokio::test]
    async fn blank_member_name_is_rejected() {
        let output = run_script("2\n\nMain St\n555-0100\n7\n").await;
        assert!(output.contains("Error: Invalid input for member name"));
    }

    #[tokio::test]
    async fn bad_copy_id_is_rejected() {
        let output = run_script("5\n-2\n7\n").await;
        assert!(output.contains("Error: Invalid input for copy ID"));
    }

    #[tokio::test]
    async fn input_ending_mid_operation_exits() {
        let output = run_script("4\n12\n").await;
        assert!(output.contains("Book title to check out: "));
        assert!(output.ends_with("Goodbye.\n"));
    }
}
