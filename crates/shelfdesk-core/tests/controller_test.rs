// Integration tests for `Controller` and the dashboard actions using wiremock.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelfdesk_core::actions::{self, ActionOutcome};
use shelfdesk_core::{
    Answers, ClientConfig, Command, Controller, CoreError, EditForm, EntityForm, EntityKind,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Controller) {
    let server = MockServer::start().await;
    let url = server.uri().parse().unwrap();
    let controller = Controller::new(ClientConfig::with_url(url)).unwrap();
    (server, controller)
}

fn books_body() -> serde_json::Value {
    json!([
        { "id": 1, "title": "Dune", "author": "Frank Herbert", "copies": 2 },
        { "id": 2, "title": "Emma", "author": "Jane Austen", "copies": 1 },
    ])
}

fn members_body() -> serde_json::Value {
    json!({ "members": [
        { "id": 7, "name": "Ada", "email": "ada@example.org", "mobile": "0123" }
    ]})
}

fn loans_body() -> serde_json::Value {
    json!([{
        "id": 3,
        "book": { "id": 1, "title": "Dune", "author": "Frank Herbert" },
        "member": { "id": 7, "name": "Ada", "email": "ada@example.org", "mobile": "0123" },
        "borrowed_at": "2024-05-01T12:00:00",
        "returned_at": null
    }])
}

async fn mount_lists(server: &MockServer, expected_fetches: u64) {
    Mock::given(method("GET"))
        .and(path("/books/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(books_body()))
        .expect(expected_fetches)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/members/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(members_body()))
        .expect(expected_fetches)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/books/borrowed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(loans_body()))
        .expect(expected_fetches)
        .mount(server)
        .await;
}

// ── Dashboard load ──────────────────────────────────────────────────

#[tokio::test]
async fn test_start_loads_exactly_returned_rows() {
    let (server, controller) = setup().await;
    mount_lists(&server, 1).await;

    assert!(controller.is_loading());
    controller.start().await;

    assert!(!controller.is_loading());
    assert!(controller.last_refresh().is_some());

    let books = controller.books_snapshot();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].title, "Dune");
    assert_eq!(controller.members_snapshot()[0].name, "Ada");
    assert_eq!(controller.loans_snapshot()[0].book.id, 1);

    controller.shutdown().await;
}

#[tokio::test]
async fn test_any_failed_fetch_clears_all_lists() {
    let (server, controller) = setup().await;
    mount_lists(&server, 1).await;
    controller.refresh().await;
    assert_eq!(controller.books_snapshot().len(), 2);

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/books/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(books_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/members/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/books/borrowed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(loans_body()))
        .mount(&server)
        .await;

    controller.refresh().await;

    assert!(!controller.is_loading());
    assert!(controller.books_snapshot().is_empty());
    assert!(controller.members_snapshot().is_empty());
    assert!(controller.loans_snapshot().is_empty());
}

#[tokio::test]
async fn test_stream_sees_refresh() {
    let (server, controller) = setup().await;
    mount_lists(&server, 1).await;

    let mut books = controller.books();
    assert!(books.current().is_empty());

    controller.refresh().await;

    let snap = books.changed().await.unwrap();
    assert_eq!(snap.len(), 2);
    assert_eq!(books.latest().len(), 2);
}

#[tokio::test]
async fn test_member_stream_yields_current_then_replacement() {
    use futures::StreamExt;

    let (server, controller) = setup().await;
    mount_lists(&server, 1).await;

    let mut members = controller.members().into_stream();
    assert!(members.next().await.unwrap().is_empty());

    controller.refresh().await;
    let snap = members.next().await.unwrap();
    assert_eq!(snap[0].email, "ada@example.org");
}

// ── Delete ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_declined_delete_sends_nothing() {
    let (server, controller) = setup().await;
    mount_lists(&server, 1).await;
    controller.refresh().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let outcome =
        actions::delete_entity(&controller, EntityKind::Book, 1, &Answers::declined()).await;

    assert_eq!(outcome, ActionOutcome::Cancelled);
    assert_eq!(controller.books_snapshot().len(), 2);
}

#[tokio::test]
async fn test_confirmed_delete_refetches() {
    let (server, controller) = setup().await;
    mount_lists(&server, 1).await;

    Mock::given(method("DELETE"))
        .and(path("/members/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let outcome =
        actions::delete_entity(&controller, EntityKind::Member, 7, &Answers::confirmed()).await;

    assert_eq!(outcome, ActionOutcome::Completed("Member deleted".into()));
    assert_eq!(controller.members_snapshot().len(), 1);
}

#[tokio::test]
async fn test_failed_delete_uses_fallback() {
    let (server, controller) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/books/1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let outcome =
        actions::delete_entity(&controller, EntityKind::Book, 1, &Answers::confirmed()).await;

    assert_eq!(outcome, ActionOutcome::Failed("Failed to delete book".into()));
    assert!(controller.is_loading());
}

// ── Borrow ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_borrow_posts_loan_and_refetches() {
    let (server, controller) = setup().await;
    mount_lists(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/loans/"))
        .and(body_json(json!({ "book_id": 2, "member_id": 7 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 4 })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = actions::borrow_book(&controller, 2, &Answers::input("7")).await;

    assert_eq!(
        outcome,
        ActionOutcome::Completed("Book borrowed successfully".into())
    );
    assert_eq!(controller.loans_snapshot().len(), 1);
}

#[tokio::test]
async fn test_borrow_without_member_is_noop() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dismissed = actions::borrow_book(&controller, 2, &Answers::declined()).await;
    assert_eq!(dismissed, ActionOutcome::Cancelled);

    let blank = actions::borrow_book(&controller, 2, &Answers::input("  ")).await;
    assert_eq!(blank, ActionOutcome::Cancelled);

    let junk = actions::borrow_book(&controller, 2, &Answers::input("seven")).await;
    assert_eq!(
        junk,
        ActionOutcome::Failed("Member ID must be a number".into())
    );
}

#[tokio::test]
async fn test_borrow_rejection_shows_detail() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .and(path("/loans/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "No copies available" })),
        )
        .mount(&server)
        .await;

    let outcome = actions::borrow_book(&controller, 2, &Answers::input("7")).await;

    assert_eq!(outcome, ActionOutcome::Failed("No copies available".into()));
}

// ── Create dialog ───────────────────────────────────────────────────

#[tokio::test]
async fn test_create_book_validation_error_inline() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .and(path("/books/"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{ "loc": ["body", "title"], "msg": "title required" }]
        })))
        .mount(&server)
        .await;

    let mut form = EntityForm::new(EntityKind::Book);
    form.open();
    form.set_field("author", "Anon").unwrap();

    let created = form.submit(&controller).await;

    assert!(!created);
    assert!(form.is_open());
    assert_eq!(form.error(), Some("title required"));
}

#[tokio::test]
async fn test_create_member_success_closes_and_refetches() {
    let (server, controller) = setup().await;
    mount_lists(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/members/"))
        .and(body_json(
            json!({ "name": "Grace", "email": "grace@example.org", "mobile": "555" }),
        ))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 8 })))
        .expect(1)
        .mount(&server)
        .await;

    let mut form = EntityForm::new(EntityKind::Member);
    form.open();
    form.set_field("name", "Grace").unwrap();
    form.set_field("email", "grace@example.org").unwrap();
    form.set_field("mobile", "555").unwrap();

    assert!(form.submit(&controller).await);
    assert!(!form.is_open());
    assert!(!controller.is_loading());
}

// ── Edit dialog ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_successful_patch_closes_and_refetches() {
    let (server, controller) = setup().await;
    mount_lists(&server, 2).await;
    controller.refresh().await;

    Mock::given(method("PATCH"))
        .and(path("/books/1"))
        .and(body_json(
            json!({ "title": "Dune", "author": "Frank Herbert", "copies": 5 }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let book = controller.books_snapshot()[0].clone();
    let mut form = EditForm::open(EntityKind::Book, book.id, &*book);
    form.set_field("copies", "5").unwrap();

    let outcome = form.submit(&controller).await;

    assert_eq!(outcome, ActionOutcome::Completed("Book updated".into()));
    assert!(!form.is_open());
}

#[tokio::test]
async fn test_patch_omits_untouched_missing_fields() {
    let (server, controller) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/books/2"))
        .and(body_json(json!({ "title": "Emma", "author": "Austen" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 2 })))
        .expect(1)
        .mount(&server)
        .await;
    mount_lists(&server, 1).await;

    let emma = json!({ "id": 2, "title": "Emma", "author": "Jane Austen", "copies": null });
    let mut form = EditForm::open(EntityKind::Book, 2, &emma);
    for field in form.fields() {
        let text = match field.name {
            "author" => "Austen".to_owned(),
            name => form.field_text(name),
        };
        form.set_field(field.name, &text).unwrap();
    }

    let outcome = form.submit(&controller).await;
    assert_eq!(outcome, ActionOutcome::Completed("Book updated".into()));
}

#[tokio::test]
async fn test_failed_patch_still_closes() {
    let (server, controller) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/members/7"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "Email already used" })),
        )
        .mount(&server)
        .await;

    let member = json!({ "id": 7, "name": "Ada", "email": "ada@example.org", "mobile": "0123" });
    let mut form = EditForm::open(EntityKind::Member, 7, &member);

    let outcome = form.submit(&controller).await;

    assert_eq!(outcome, ActionOutcome::Failed("Email already used".into()));
    assert!(!form.is_open());
}

// ── Direct reads ────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_reads_propagate_errors() {
    let (server, controller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/books/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = controller.list_books().await.unwrap_err();
    assert!(matches!(err, CoreError::Rejected { status: 503, .. }));

    let err = controller
        .execute(Command::Delete {
            kind: EntityKind::Book,
            id: 99,
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to delete book");
}

#[tokio::test]
async fn test_timeout_reports_configured_limit() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut config = ClientConfig::with_url(server.uri().parse().unwrap());
    config.timeout = Duration::from_secs(1);
    let controller = Controller::new(config).unwrap();

    let err = controller
        .execute(Command::Delete {
            kind: EntityKind::Book,
            id: 1,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Timeout { timeout_secs: 1 }));
    assert_eq!(err.to_string(), "Library API timed out after 1s");
}

// ── One-shot ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_execute_without_reload_skips_refetch() {
    let server = MockServer::start().await;
    mount_lists(&server, 0).await;
    Mock::given(method("DELETE"))
        .and(path("/books/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = ClientConfig::with_url(server.uri().parse().unwrap());
    config.reload_after_mutation = false;
    let controller = Controller::new(config).unwrap();

    controller
        .execute(Command::Delete {
            kind: EntityKind::Book,
            id: 1,
        })
        .await
        .unwrap();
    assert!(controller.books_snapshot().is_empty());
}

#[tokio::test]
async fn test_oneshot_never_reloads_after_commands() {
    let server = MockServer::start().await;
    mount_lists(&server, 0).await;
    Mock::given(method("DELETE"))
        .and(path("/members/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::with_url(server.uri().parse().unwrap());
    Controller::oneshot(config, |controller| async move {
        controller
            .execute(Command::Delete {
                kind: EntityKind::Member,
                id: 7,
            })
            .await
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_oneshot_runs_closure_against_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(books_body()))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::with_url(server.uri().parse().unwrap());
    let titles = Controller::oneshot(config, |controller| async move {
        let books = controller.list_books().await?;
        Ok(books.into_iter().map(|b| b.title).collect::<Vec<_>>())
    })
    .await
    .unwrap();

    assert_eq!(titles, vec!["Dune", "Emma"]);
}
