//! Filter and page parameters of the prescription list, and the rule that
//! decides when a change of them has to hit the backend.

use chrono::{Local, NaiveDate};
use shared::{domain::first_day_of_month, protocol::ListPrescriptionsQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryState {
    pub page: u32,
    pub page_size: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl QueryState {
    /// Page 1 of the current month up to `today`.
    pub fn defaults_for(today: NaiveDate, page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            start_date: first_day_of_month(today),
            end_date: today,
        }
    }

    pub fn is_inverted_range(&self) -> bool {
        self.start_date > self.end_date
    }

    pub fn to_query(&self) -> ListPrescriptionsQuery {
        ListPrescriptionsQuery {
            page: self.page,
            size: self.page_size,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    /// Applies `intent`, given the page count the last response reported.
    pub fn apply(&self, intent: &ListIntent, total_pages: u32) -> Self {
        let mut next = *self;
        match *intent {
            ListIntent::NextPage => {
                if self.page < total_pages {
                    next.page = self.page + 1;
                }
            }
            ListIntent::PreviousPage => {
                if self.page > 1 {
                    next.page = self.page - 1;
                }
            }
            ListIntent::GoToPage(page) => {
                if page >= 1 {
                    next.page = page;
                }
            }
            ListIntent::SetStartDate(date) => {
                if date != self.start_date {
                    next.start_date = date;
                    next.page = 1;
                }
            }
            ListIntent::SetEndDate(date) => {
                if date != self.end_date {
                    next.end_date = date;
                    next.page = 1;
                }
            }
            ListIntent::Reset { today } => {
                next = Self::defaults_for(today, self.page_size);
            }
            ListIntent::Refresh => {}
        }
        next
    }
}

/// User intents emitted by the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListIntent {
    NextPage,
    PreviousPage,
    GoToPage(u32),
    SetStartDate(NaiveDate),
    SetEndDate(NaiveDate),
    /// Restores the default range for `today` and page 1 in one step.
    Reset { today: NaiveDate },
    /// Re-issues the current query even though nothing changed.
    Refresh,
}

impl ListIntent {
    pub fn reset_now() -> Self {
        Self::Reset {
            today: Local::now().date_naive(),
        }
    }
}

/// A list fetch tagged with the controller generation that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub query: ListPrescriptionsQuery,
}

/// Whether moving from `prev` to `next` needs a fetch, and with which parameters.
///
/// `generation` is the tag the resulting request will carry. A transition
/// that leaves page, size and both dates untouched yields `None`.
pub fn on_state_change(
    prev: &QueryState,
    next: &QueryState,
    generation: u64,
) -> Option<FetchRequest> {
    if prev == next {
        return None;
    }
    Some(FetchRequest {
        generation,
        query: next.to_query(),
    })
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
