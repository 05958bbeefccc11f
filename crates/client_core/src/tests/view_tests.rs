use super::*;
use crate::{
    error::ClientError,
    list::ListController,
    test_support::{day, page_of},
};

fn loaded(page: u32, rows: std::ops::Range<i64>, total_pages: u32) -> ListController {
    let today = day(2024, 6, 14);
    let mut controller = ListController::new(today, 10);
    let mut request = controller.mount(today);
    if page > 1 {
        request = controller
            .dispatch(crate::query::ListIntent::GoToPage(page))
            .expect("page fetch");
    }
    controller.complete::<ClientError>(request.generation, Ok(page_of(rows, total_pages)));
    controller
}

fn table(model: &ListViewModel) -> (&[RowView], &PaginationView) {
    match &model.body {
        ListBody::Table { rows, pagination } => (rows.as_slice(), pagination),
        other => panic!("expected table, got {other:?}"),
    }
}

#[test]
fn initial_load_with_five_rows_of_three_pages() {
    let controller = loaded(1, 0..5, 3);
    let model = render_list(&controller);
    let (rows, pagination) = table(&model);

    assert_eq!(rows.len(), 5);
    let numbers: Vec<u64> = rows.iter().map(|row| row.sequence).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    assert!(!pagination.previous_enabled);
    assert!(pagination.next_enabled);
    assert_eq!(pagination.label, "Page 1 of 3");
    assert_eq!(model.error_banner, None);
}

#[test]
fn sequence_numbers_are_offset_by_page() {
    for page in 1..=5u32 {
        for page_size in [1u32, 5, 10, 25] {
            for index in 0..page_size as usize {
                assert_eq!(
                    sequence_number(index, page, page_size),
                    index as u64 + 1 + u64::from(page - 1) * u64::from(page_size)
                );
            }
        }
    }

    let model = render_list(&loaded(3, 20..30, 4));
    let (rows, _) = table(&model);
    assert_eq!(rows.first().map(|row| row.sequence), Some(21));
    assert_eq!(rows.last().map(|row| row.sequence), Some(30));
}

#[test]
fn pagination_controls_follow_page_bounds() {
    for total_pages in 1..=6u32 {
        for page in 1..=total_pages {
            let view = pagination(page, total_pages);
            assert_eq!(view.previous_enabled, page > 1);
            assert_eq!(view.next_enabled, page < total_pages);
        }
    }

    let none = pagination(1, 0);
    assert!(!none.previous_enabled);
    assert!(!none.next_enabled);
}

#[test]
fn empty_content_renders_message_without_table() {
    let model = render_list(&loaded(1, 0..0, 0));
    assert_eq!(
        model.body,
        ListBody::Empty {
            message: EMPTY_LIST_MESSAGE
        }
    );
}

#[test]
fn loading_state_renders_only_spinner() {
    let today = day(2024, 6, 14);
    let mut controller = ListController::new(today, 10);
    controller.mount(today);
    assert_eq!(render_list(&controller).body, ListBody::Loading);
}

#[test]
fn failed_fetch_keeps_table_and_shows_banner() {
    let mut controller = loaded(1, 0..3, 2);
    let request = controller
        .dispatch(crate::query::ListIntent::NextPage)
        .expect("fetch");
    controller.complete(request.generation, Err("server returned 500"));

    let model = render_list(&controller);
    let (rows, _) = table(&model);
    assert_eq!(rows.len(), 3);
    assert!(model
        .error_banner
        .as_deref()
        .is_some_and(|banner| banner.contains("server returned 500")));
}

#[test]
fn rows_are_formatted_for_display() {
    let model = render_list(&loaded(1, 1..3, 1));
    let (rows, _) = table(&model);
    assert_eq!(rows[0].name, "Patient 1");
    assert_eq!(rows[0].gender, "Male");
    assert_eq!(rows[0].prescription_date, "03/06/2024");
    assert_eq!(rows[0].details.path(), "/prescription/1");
}

#[test]
fn inverted_range_shows_hint() {
    let mut controller = loaded(1, 0..3, 1);
    let request = controller
        .dispatch(crate::query::ListIntent::SetEndDate(day(2024, 5, 1)))
        .expect("fetch");
    controller.complete::<ClientError>(request.generation, Ok(page_of(0..0, 0)));
    assert!(render_list(&controller).range_hint.is_some());
}

#[test]
fn title_case_handles_words_and_empty_input() {
    assert_eq!(title_case("ada  lovelace"), "Ada Lovelace");
    assert_eq!(title_case(""), "");
    assert_eq!(title_case("éva"), "Éva");
}

#[test]
fn overview_sorts_newest_first_and_totals() {
    let counts = vec![
        DailyCount {
            date: "01-06-2024".to_string(),
            count: 2,
        },
        DailyCount {
            date: "14-06-2024".to_string(),
            count: 5,
        },
        DailyCount {
            date: "garbage".to_string(),
            count: 1,
        },
    ];
    let model = render_overview(&counts);
    assert_eq!(model.total, 8);
    assert_eq!(model.rows[0].date, "14/06/2024");
    assert_eq!(model.rows[1].date, "01/06/2024");
    assert_eq!(model.rows[2].date, "garbage");
}
