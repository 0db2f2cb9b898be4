//! Wire-level tests of the REST client against a mock server

mod common;

use blogdesk_client::{ClientError, LOGIN_FAILED};
use blogdesk_core::blog::fields;
use blogdesk_core::types::{CreateAdminRequest, LoginRequest};
use blogdesk_core::{
    AccessGate, BlogForm, CredentialStore, Gate, Route, StagedFile, SubmitFailure, SubmitOutcome,
};
use common::*;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_login_stores_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "admin@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc"})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client(&server);
    let credential = client
        .login(
            &LoginRequest {
                email: "admin@example.com".to_string(),
                password: "secret".to_string(),
            },
            7,
        )
        .await
        .unwrap();

    assert_eq!(credential.token, "abc");
    assert_eq!(store.current().unwrap(), Some(credential));

    let gate = AccessGate::new(store);
    assert_eq!(gate.navigate(Route::Login), Gate::Redirect(Route::Home));
}

#[tokio::test]
async fn test_login_failure_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Wrong password"})),
        )
        .mount(&server)
        .await;

    let (client, store) = client(&server);
    let request = LoginRequest {
        email: "a@b.c".to_string(),
        password: "nope".to_string(),
    };
    let err = client.login(&request, 7).await.unwrap_err();
    assert_eq!(err.server_message(), Some("Wrong password"));
    assert!(store.current().unwrap().is_none());
}

#[tokio::test]
async fn test_login_failure_without_message_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (client, _) = client(&server);
    let request = LoginRequest {
        email: "a@b.c".to_string(),
        password: "pw".to_string(),
    };
    let err: blogdesk_core::Error = client.login(&request, 7).await.unwrap_err().into();
    assert_eq!(err.message_or(LOGIN_FAILED), "Invalid credentials");
}

#[tokio::test]
async fn test_login_with_empty_field_never_calls_server() {
    let server = MockServer::start().await;
    let (client, _) = client(&server);

    let request = LoginRequest {
        email: String::new(),
        password: "pw".to_string(),
    };
    let err = client.login(&request, 7).await.unwrap_err();
    assert!(matches!(err, ClientError::Core(blogdesk_core::Error::Validation { .. })));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_blogs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blog"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "blogs": [blog_json("1"), blog_json("2")]})),
        )
        .mount(&server)
        .await;

    let (client, _) = client(&server);
    let blogs = client.list_blogs().await.unwrap();
    assert_eq!(blogs.len(), 2);
    assert_eq!(blogs[1].id, "2");
}

#[tokio::test]
async fn test_list_blogs_without_success_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let (client, _) = client(&server);
    let err: blogdesk_core::Error = client.list_blogs().await.unwrap_err().into();
    assert_eq!(err.message_or("Failed to load blogs"), "Failed to load blogs");
}

#[tokio::test]
async fn test_get_missing_blog_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blog/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/blog/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let (client, _) = client(&server);
    for id in ["404", "empty"] {
        let err = BlogForm::load(&client, Some(id)).await.unwrap_err();
        assert_eq!(err.user_message(), "Blog not found");
    }
}

#[tokio::test]
async fn test_load_blog_with_null_fields() {
    let server = MockServer::start().await;
    let mut blog = blog_json("n1");
    blog["tags"] = Value::Null;
    blog["author"] = Value::Null;
    Mock::given(method("GET"))
        .and(path("/api/blog/n1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "blog": blog})))
        .mount(&server)
        .await;

    let (client, _) = client(&server);
    let form = BlogForm::load(&client, Some("n1")).await.unwrap();
    assert_eq!(form.state().text(fields::AUTHOR), Some(""));
    assert!(form.state().list(fields::TAGS).unwrap().is_empty());
    assert!(form.diff().is_empty());
}

#[tokio::test]
async fn test_edit_sends_only_changed_fields_with_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blog/123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "blog": blog_json("123")})),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/blog/123"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = signed_in_client(&server);
    let mut form = BlogForm::load(&client, Some("123")).await.unwrap();
    form.set_text(fields::AUTHOR, "Ann").unwrap();

    assert_eq!(form.submit(&client).await, SubmitOutcome::Updated);

    let requests = server.received_requests().await.unwrap();
    let put = requests
        .iter()
        .find(|request| request.method.as_str() == "PUT")
        .unwrap();
    assert_eq!(multipart_field_names(&put.body), vec!["author"]);
}

#[tokio::test]
async fn test_unchanged_edit_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blog/123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "blog": blog_json("123")})),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _) = signed_in_client(&server);
    let mut form = BlogForm::load(&client, Some("123")).await.unwrap();
    assert_eq!(form.submit(&client).await, SubmitOutcome::NoChange);
}

#[tokio::test]
async fn test_create_posts_every_field_and_image() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/blog"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = signed_in_client(&server);
    let mut form = BlogForm::create();
    form.set_text(fields::TITLE, "Hello").unwrap();
    form.set_text(fields::SHORT_DESCRIPTION, "Intro").unwrap();
    form.stage_file(fields::IMAGE, StagedFile::image("cover.png", vec![0x89, 0x50]).unwrap())
        .unwrap();

    assert_eq!(form.submit(&client).await, SubmitOutcome::Created);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        multipart_field_names(&requests[0].body),
        vec![
            "title",
            "shortDescription",
            "category",
            "author",
            "tags",
            "image",
            "description"
        ]
    );
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("Content-Type: image/png"));
}

#[tokio::test]
async fn test_create_rejected_with_ok_status_keeps_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/blog"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "Title exists"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = signed_in_client(&server);
    let mut form = BlogForm::create();
    form.set_text(fields::TITLE, "Hello").unwrap();
    form.set_text(fields::SHORT_DESCRIPTION, "Intro").unwrap();

    assert_eq!(
        form.submit(&client).await,
        SubmitOutcome::Failed(SubmitFailure::Rejected {
            message: "Title exists".to_string()
        })
    );
}

#[tokio::test]
async fn test_unauthorized_update_clears_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blog/123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "blog": blog_json("123")})),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/blog/123"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})))
        .mount(&server)
        .await;

    let (client, store) = signed_in_client(&server);
    let mut form = BlogForm::load(&client, Some("123")).await.unwrap();
    form.set_text(fields::TITLE, "B").unwrap();

    assert_eq!(
        form.submit(&client).await,
        SubmitOutcome::Failed(SubmitFailure::Unauthorized)
    );
    assert!(store.current().unwrap().is_none());
    assert_eq!(form.baseline().text(fields::TITLE), Some("A"));

    let gate = AccessGate::new(store);
    assert_eq!(gate.navigate(Route::Blogs), Gate::Redirect(Route::Login));
}

#[tokio::test]
async fn test_rejected_update_uses_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blog/123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "blog": blog_json("123")})),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/blog/123"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "Title too long"})),
        )
        .mount(&server)
        .await;

    let (client, _) = signed_in_client(&server);
    let mut form = BlogForm::load(&client, Some("123")).await.unwrap();
    form.set_text(fields::TITLE, "B").unwrap();

    assert_eq!(
        form.submit(&client).await,
        SubmitOutcome::Failed(SubmitFailure::Rejected {
            message: "Title too long".to_string()
        })
    );
}

#[tokio::test]
async fn test_delete_blog() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/blog/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/blog/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let (client, _) = signed_in_client(&server);
    client.delete_blog("1").await.unwrap();

    let err = client.delete_blog("2").await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected { message: None }));
}

#[tokio::test]
async fn test_contacts_and_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/contact"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contacts": [{"_id": "c1", "name": "Bob", "email": "b@x.io", "phone": "1", "project": "Web"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/schedule-call"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "calls": [{"_id": "s1", "name": "Carol", "email": "c@x.io", "preferredDate": "2024-05-01"}]
        })))
        .mount(&server)
        .await;

    let (client, _) = signed_in_client(&server);
    let contacts = client.list_contacts().await.unwrap();
    assert_eq!(contacts[0].status.to_string(), "Pending");

    let calls = client.list_calls().await.unwrap();
    assert_eq!(calls[0].preferred_date, "2024-05-01");
    assert!(calls[0].message.is_none());
}

#[tokio::test]
async fn test_create_admin() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/create-admin"))
        .and(body_json(json!({"name": "Eve", "email": "e@x.io", "password": "pw"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = signed_in_client(&server);
    let response = client
        .create_admin(&CreateAdminRequest {
            name: "Eve".to_string(),
            email: "e@x.io".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap();
    assert!(response.success);
}

#[tokio::test]
async fn test_logout_clears_credential() {
    let server = MockServer::start().await;
    let (client, store) = signed_in_client(&server);

    client.logout().unwrap();
    assert!(store.current().unwrap().is_none());
    client.logout().unwrap();
}
