//! Render models: pure functions from controller state to what the screen shows.

use chrono::NaiveDate;
use shared::{
    domain::PrescriptionId,
    protocol::{DailyCount, PrescriptionSummary},
};

use crate::{list::ListController, router::Route};

pub const EMPTY_LIST_MESSAGE: &str = "No prescriptions found.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub sequence: u64,
    pub id: PrescriptionId,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub prescription_date: String,
    pub details: Route,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub previous_enabled: bool,
    pub next_enabled: bool,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListBody {
    Loading,
    Empty { message: &'static str },
    Table {
        rows: Vec<RowView>,
        pagination: PaginationView,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListViewModel {
    pub body: ListBody,
    pub error_banner: Option<String>,
    /// Shown next to the end-date input; the range is sent as entered.
    pub range_hint: Option<&'static str>,
}

/// 1-based position of `index` in the whole result set.
pub fn sequence_number(index: usize, page: u32, page_size: u32) -> u64 {
    index as u64 + 1 + u64::from(page.saturating_sub(1)) * u64::from(page_size)
}

pub fn pagination(page: u32, total_pages: u32) -> PaginationView {
    PaginationView {
        previous_enabled: page > 1,
        next_enabled: page < total_pages,
        label: format!("Page {page} of {total_pages}"),
    }
}

pub fn render_list(controller: &ListController) -> ListViewModel {
    let query = controller.query();
    let body = if controller.is_loading() {
        ListBody::Loading
    } else if controller.is_empty() {
        ListBody::Empty {
            message: EMPTY_LIST_MESSAGE,
        }
    } else {
        let rows = controller
            .rows()
            .iter()
            .enumerate()
            .map(|(index, row)| row_view(row, sequence_number(index, query.page, query.page_size)))
            .collect();
        ListBody::Table {
            rows,
            pagination: pagination(query.page, controller.total_pages()),
        }
    };

    ListViewModel {
        body,
        error_banner: controller
            .last_error()
            .map(|err| format!("Could not load prescriptions: {err}")),
        range_hint: query
            .is_inverted_range()
            .then_some("End date is before start date"),
    }
}

fn row_view(row: &PrescriptionSummary, sequence: u64) -> RowView {
    RowView {
        sequence,
        id: row.id,
        name: title_case(&row.name),
        age: row.age,
        gender: title_case(&row.gender),
        prescription_date: display_date(row.prescription_day(), &row.prescription_date),
        details: Route::PrescriptionDetail(row.id),
    }
}

pub fn display_date(day: Option<NaiveDate>, raw: &str) -> String {
    match day {
        Some(day) => day.format("%d/%m/%Y").to_string(),
        None => raw.to_string(),
    }
}

/// Upper-cases the first letter of each whitespace separated word.
pub fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewRow {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewModel {
    pub rows: Vec<OverviewRow>,
    pub total: u64,
}

/// Newest day first; rows whose date cannot be read sink to the bottom.
pub fn render_overview(counts: &[DailyCount]) -> OverviewModel {
    let mut sorted: Vec<&DailyCount> = counts.iter().collect();
    sorted.sort_by(|a, b| b.day().cmp(&a.day()));
    OverviewModel {
        rows: sorted
            .into_iter()
            .map(|count| OverviewRow {
                date: display_date(count.day(), &count.date),
                count: count.count,
            })
            .collect(),
        total: counts.iter().map(|count| count.count).sum(),
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
