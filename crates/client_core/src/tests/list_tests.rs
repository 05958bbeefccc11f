use super::*;
use crate::{
    error::ClientError,
    test_support::{day, page_of, FakeBackend},
};

const TODAY: (i32, u32, u32) = (2024, 6, 14);

fn today() -> NaiveDate {
    day(TODAY.0, TODAY.1, TODAY.2)
}

fn mounted() -> (ListController, FetchRequest) {
    let mut controller = ListController::new(today(), 10);
    let request = controller.mount(today());
    (controller, request)
}

#[test]
fn mount_issues_default_query_and_sets_loading() {
    let (controller, request) = mounted();
    assert!(controller.is_loading());
    assert_eq!(request.query.page, 1);
    assert_eq!(request.query.size, 10);
    assert_eq!(request.query.start_date, day(2024, 6, 1));
    assert_eq!(request.query.end_date, today());
}

#[test]
fn successful_response_replaces_rows_and_flags() {
    let (mut controller, request) = mounted();
    let outcome = controller.complete::<ClientError>(request.generation, Ok(page_of(0..5, 3)));

    assert_eq!(outcome, Completion::Applied);
    assert!(!controller.is_loading());
    assert!(!controller.is_empty());
    assert_eq!(controller.rows().len(), 5);
    assert_eq!(controller.total_pages(), 3);
}

#[test]
fn empty_content_sets_empty_flag() {
    let (mut controller, request) = mounted();
    controller.complete::<ClientError>(request.generation, Ok(page_of(0..0, 0)));
    assert!(controller.is_empty());
    assert!(controller.rows().is_empty());
}

#[test]
fn late_response_for_superseded_page_is_discarded() {
    let (mut controller, first) = mounted();
    controller.complete::<ClientError>(first.generation, Ok(page_of(0..10, 3)));

    let page_two = controller.dispatch(ListIntent::NextPage).expect("page 2 fetch");
    let page_three = controller.dispatch(ListIntent::NextPage).expect("page 3 fetch");
    assert!(page_three.generation > page_two.generation);

    // Page 3 answers first, then the slower page 2 response arrives.
    assert_eq!(
        controller.complete::<ClientError>(page_three.generation, Ok(page_of(20..25, 3))),
        Completion::Applied
    );
    assert_eq!(
        controller.complete::<ClientError>(page_two.generation, Ok(page_of(10..20, 3))),
        Completion::Stale
    );

    assert_eq!(controller.query().page, 3);
    assert_eq!(controller.rows()[0].id.0, 20);
    assert_eq!(controller.rows().len(), 5);
}

#[test]
fn stale_response_does_not_clear_loading_of_newer_request() {
    let (mut controller, first) = mounted();
    let second = controller
        .dispatch(ListIntent::SetStartDate(day(2024, 5, 1)))
        .expect("fetch");

    controller.complete::<ClientError>(first.generation, Ok(page_of(0..3, 1)));
    assert!(controller.is_loading());
    assert!(controller.rows().is_empty());

    controller.complete::<ClientError>(second.generation, Ok(page_of(0..7, 1)));
    assert!(!controller.is_loading());
    assert_eq!(controller.rows().len(), 7);
}

#[test]
fn failure_keeps_previous_rows_and_records_error() {
    let (mut controller, first) = mounted();
    controller.complete::<ClientError>(first.generation, Ok(page_of(0..4, 2)));

    let next = controller.dispatch(ListIntent::NextPage).expect("fetch");
    controller.complete(next.generation, Err("server returned 500"));

    assert!(!controller.is_loading());
    assert_eq!(controller.rows().len(), 4);
    assert_eq!(controller.total_pages(), 2);
    assert_eq!(controller.last_error(), Some("server returned 500"));

    let retry = controller.dispatch(ListIntent::Refresh).expect("refresh");
    controller.complete::<ClientError>(retry.generation, Ok(page_of(10..12, 2)));
    assert_eq!(controller.last_error(), None);
}

#[test]
fn reset_from_other_state_is_one_fetch_with_both_changes() {
    let (mut controller, first) = mounted();
    controller.complete::<ClientError>(first.generation, Ok(page_of(0..10, 4)));
    controller.dispatch(ListIntent::SetStartDate(day(2024, 1, 1)));
    controller.dispatch(ListIntent::GoToPage(3));

    let request = controller
        .dispatch(ListIntent::Reset { today: today() })
        .expect("reset fetch");
    assert_eq!(request.query.page, 1);
    assert_eq!(request.query.start_date, day(2024, 6, 1));
    assert_eq!(request.query.end_date, today());
}

#[test]
fn no_op_intents_do_not_bump_generation() {
    let (mut controller, first) = mounted();
    controller.complete::<ClientError>(first.generation, Ok(page_of(0..5, 1)));

    assert_eq!(controller.dispatch(ListIntent::NextPage), None);
    assert_eq!(controller.dispatch(ListIntent::PreviousPage), None);
    assert_eq!(controller.generation(), first.generation);
    assert!(!controller.is_loading());
}

#[test]
fn teardown_discards_in_flight_response() {
    let (mut controller, first) = mounted();
    controller.teardown();
    assert!(!controller.is_loading());
    assert_eq!(
        controller.complete::<ClientError>(first.generation, Ok(page_of(0..5, 1))),
        Completion::Stale
    );
    assert!(controller.rows().is_empty());
}

#[tokio::test]
async fn driver_shows_latest_page_when_earlier_response_arrives_late() {
    let backend = Arc::new(
        FakeBackend::default()
            .with_page(1, page_of(0..10, 2))
            .with_page(2, page_of(10..15, 2)),
    );
    let driver = ListDriver::new(backend.clone(), today(), 10);

    driver.mount(today()).await;
    driver.wait_idle().await;
    assert_eq!(driver.snapshot().await.total_pages(), 2);

    // Ask for page 2, then go back to page 1 whose response is held back,
    // then forward to page 2 again before page 1 is released.
    let release_page_one = backend.hold_page(1);
    assert!(driver.dispatch(ListIntent::NextPage).await);
    driver.wait_idle().await;
    assert!(driver.dispatch(ListIntent::PreviousPage).await);
    assert!(driver.dispatch(ListIntent::NextPage).await);
    driver.wait_idle().await;
    let _ = release_page_one.send(());
    tokio::task::yield_now().await;

    let snapshot = driver.snapshot().await;
    assert_eq!(snapshot.query().page, 2);
    assert_eq!(snapshot.rows().len(), 5);
    assert_eq!(snapshot.rows()[0].id.0, 10);
    assert!(!snapshot.is_loading());
}

#[tokio::test]
async fn driver_reports_server_errors_without_losing_rows() {
    let backend = Arc::new(FakeBackend::failing(503));
    let driver = ListDriver::new(backend.clone(), today(), 10);

    driver.mount(today()).await;
    driver.wait_idle().await;

    let snapshot = driver.snapshot().await;
    assert!(!snapshot.is_loading());
    assert!(snapshot.rows().is_empty());
    let err = snapshot.last_error().expect("error recorded");
    assert!(err.contains("503"), "unexpected error: {err}");
    assert_eq!(backend.list_call_count(), 1);
}

#[tokio::test]
async fn dropping_driver_aborts_outstanding_fetch() {
    let backend = Arc::new(FakeBackend::default().with_page(1, page_of(0..3, 1)));
    let release = backend.hold_page(1);
    let driver = ListDriver::new(backend.clone(), today(), 10);
    driver.mount(today()).await;
    while backend.list_call_count() == 0 {
        tokio::task::yield_now().await;
    }
    drop(driver);

    // Nobody is waiting on the gate any more once the task was aborted.
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert!(release.send(()).is_err());
}
