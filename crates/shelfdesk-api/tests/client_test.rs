// Integration tests for `LibraryClient` using wiremock.
#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelfdesk_api::{Error, LibraryClient, NewBook, NewLoan, NewMember};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, LibraryClient) {
    let server = MockServer::start().await;
    let client = LibraryClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Listing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_books_bare_array() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/books/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "title": "Dune", "author": "Frank Herbert", "copies": 2 },
            { "id": 2, "title": "Emma", "author": "Jane Austen" },
        ])))
        .mount(&server)
        .await;

    let books = client.list_books().await.unwrap();

    assert_eq!(books.len(), 2);
    assert_eq!(books[0].title, "Dune");
    assert_eq!(books[0].copies, Some(2));
    assert_eq!(books[1].author, "Jane Austen");
}

#[tokio::test]
async fn test_list_members_wrapped() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/members/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "members": [
                { "id": 7, "name": "Ada", "email": "ada@example.org", "mobile": "0123" }
            ]
        })))
        .mount(&server)
        .await;

    let members = client.list_members().await.unwrap();

    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, 7);
    assert_eq!(members[0].mobile, "0123");
}

#[tokio::test]
async fn test_list_books_missing_field_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/books/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 0 })))
        .mount(&server)
        .await;

    assert!(client.list_books().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_loans() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/books/borrowed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 3,
                "book": { "id": 1, "title": "Dune", "author": "Frank Herbert" },
                "member": { "id": 7, "name": "Ada", "email": "ada@example.org", "mobile": "0123" },
                "borrowed_at": "2024-05-01T12:00:00",
                "returned_at": null
            }
        ])))
        .mount(&server)
        .await;

    let loans = client.list_loans().await.unwrap();

    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0].book.title, "Dune");
    assert_eq!(loans[0].member.name, "Ada");
    assert!(loans[0].returned_at.is_none());
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_book_posts_json() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/books/"))
        .and(body_json(json!({ "title": "Dune", "author": "Frank Herbert" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": 11, "title": "Dune" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let created = client
        .create_book(&NewBook {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
        })
        .await
        .unwrap();

    assert_eq!(created["id"], 11);
}

#[tokio::test]
async fn test_create_member_posts_json() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/members/"))
        .and(body_json(json!({ "name": "Ada", "email": "ada@example.org", "mobile": "0123" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 7 })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .create_member(&NewMember {
            name: "Ada".into(),
            email: "ada@example.org".into(),
            mobile: "0123".into(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_loan_posts_ids() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/loans/"))
        .and(body_json(json!({ "book_id": 1, "member_id": 7 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 3 })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .create_loan(&NewLoan {
            book_id: 1,
            member_id: 7,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_update_entity_patches_path() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/books/5"))
        .and(body_json(json!({ "title": "Dune Messiah", "copies": 4 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 5 })))
        .expect(1)
        .mount(&server)
        .await;

    let body = json!({ "title": "Dune Messiah", "copies": 4 });
    client.update_entity("books", 5, &body).await.unwrap();
}

#[tokio::test]
async fn test_delete_entity_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/members/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let value = client.delete_entity("members", 7).await.unwrap();
    assert!(value.is_null());
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_validation_detail_array_joined() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/books/"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [
                { "loc": ["body", "title"], "msg": "title required", "type": "missing" },
                { "loc": ["body", "author"], "msg": "author required", "type": "missing" }
            ]
        })))
        .mount(&server)
        .await;

    let err = client
        .create_book(&NewBook {
            title: String::new(),
            author: String::new(),
        })
        .await
        .unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message.as_deref(), Some("title required, author required"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_string_detail_kept() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/loans/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "No copies available" })),
        )
        .mount(&server)
        .await;

    let err = client
        .create_loan(&NewLoan {
            book_id: 1,
            member_id: 2,
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.detail(), Some("No copies available"));
}

#[tokio::test]
async fn test_error_without_detail() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/books/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let err = client.delete_entity("books", 9).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.detail(), None);
}

#[tokio::test]
async fn test_deserialization_error_has_preview() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/members/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.list_members().await.unwrap_err();

    match err {
        Error::Deserialization { message, body } => {
            assert!(message.contains("body preview"));
            assert_eq!(body, "<html>oops</html>");
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
