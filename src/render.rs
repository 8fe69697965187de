//! Table rendering for search results and reports.

use chrono::NaiveDate;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{CellAlignment, ContentArrangement, Table};
use core_types::{BookSummary, CopyDiscrepancy, OverdueLoan};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn align_right(table: &mut Table, columns: &[usize]) {
    for &index in columns {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

/// Search results: one row per title with owned and available counts.
pub fn books_table(rows: &[BookSummary]) -> Table {
    let mut table = new_table(vec!["ID", "Title", "Author", "Owned", "Avail"]);
    for row in rows {
        table.add_row(vec![
            row.book_id.to_string(),
            row.title.clone(),
            row.author_name.clone(),
            row.total_copies.to_string(),
            row.available_copies.to_string(),
        ]);
    }
    align_right(&mut table, &[0, 3, 4]);
    table
}

pub fn overdue_table(rows: &[OverdueLoan], as_of: NaiveDate) -> Table {
    let mut table = new_table(vec![
        "Loan ID",
        "Copy ID",
        "Title",
        "Member",
        "Due Date",
        "Days Late",
    ]);
    for row in rows {
        table.add_row(vec![
            row.loan_id.to_string(),
            row.copy_id.to_string(),
            row.title.clone(),
            format!("{} (#{})", row.member_name, row.member_id),
            row.due_date.format("%Y-%m-%d").to_string(),
            row.days_overdue(as_of).to_string(),
        ]);
    }
    align_right(&mut table, &[0, 1, 5]);
    table
}

pub fn audit_table(rows: &[CopyDiscrepancy]) -> Table {
    let mut table = new_table(vec!["Copy ID", "Status", "Open Loans"]);
    for row in rows {
        table.add_row(vec![
            row.copy_id.to_string(),
            row.status.to_string(),
            row.open_loans.to_string(),
        ]);
    }
    align_right(&mut table, &[0, 2]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::CopyStatus;

    #[test]
    fn books_table_lists_counts() {
        let rows = vec![BookSummary {
            book_id: 1,
            title: "Dune".to_string(),
            author_name: "Frank Herbert".to_string(),
            total_copies: 2,
            available_copies: 1,
        }];
        let rendered = books_table(&rows).to_string();
        assert!(rendered.contains("Owned"));
        assert!(rendered.contains("Dune"));
        assert!(rendered.contains("Frank Herbert"));
    }

    #[test]
    fn overdue_table_shows_days_late() {
        let rows = vec![OverdueLoan {
            loan_id: 4,
            copy_id: 9,
            title: "Emma".to_string(),
            member_id: 2,
            member_name: "Ada".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 5, 27).unwrap(),
        }];
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let rendered = overdue_table(&rows, as_of).to_string();
        assert!(rendered.contains("2024-05-27"));
        assert!(rendered.contains("Ada (#2)"));
        assert!(rendered.contains(" 5 "));
    }

    #[test]
    fn audit_table_names_status() {
        let rows = vec![CopyDiscrepancy {
            copy_id: 3,
            status: CopyStatus::OnLoan,
            open_loans: 0,
        }];
        assert!(audit_table(&rows).to_string().contains("On Loan"));
    }
}
