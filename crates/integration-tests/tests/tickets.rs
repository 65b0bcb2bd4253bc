//! Ticket list, detail, creation validation, and mutation behavior.

use helpdesk_integration_tests::{client, location, login, spawn_stack};

#[tokio::test]
async fn list_filters_are_forwarded_to_the_backend() {
    let (backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "agent").await;

    let resp = client
        .get(format!("{console}/tickets?status=open&search=printer"))
        .send()
        .await
        .expect("tickets");
    assert!(resp.status().is_success());

    let queries = backend.with_record(|r| r.list_ticket_queries.clone());
    let forwarded = queries
        .iter()
        .any(|q| q.contains("status=open") && q.contains("search=printer"));
    assert!(forwarded, "no forwarded filter query in {queries:?}");
}

#[tokio::test]
async fn unknown_ticket_renders_the_not_found_page() {
    let (_backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "enduser").await;

    let resp = client
        .get(format!("{console}/tickets/123"))
        .send()
        .await
        .expect("detail");
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Ticket not found"));
}

#[tokio::test]
async fn invalid_submission_never_reaches_the_backend() {
    let (backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "enduser").await;

    let form = reqwest::multipart::Form::new()
        .text("subject", "   ")
        .text("description", "It is broken")
        .text("category_id", "1")
        .text("priority", "medium");
    let resp = client
        .post(format!("{console}/tickets"))
        .multipart(form)
        .send()
        .await
        .expect("create");
    assert!(resp.status().is_success());
    let body = resp.text().await.expect("body");
    assert!(body.contains("Subject is required"), "{body}");
    // The typed fields survive the re-render.
    assert!(body.contains("It is broken"));
    assert_eq!(backend.with_record(|r| r.create_ticket_calls), 0);
}

#[tokio::test]
async fn oversized_attachments_get_the_inline_size_message() {
    let (backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "enduser").await;

    let big = reqwest::multipart::Part::bytes(vec![0u8; 17 * 1024 * 1024])
        .file_name("dump.pdf")
        .mime_str("application/pdf")
        .expect("attachment part");
    let form = reqwest::multipart::Form::new()
        .text("subject", "Printer is on fire")
        .text("description", "It is literally on fire.")
        .text("category_id", "1")
        .text("priority", "urgent")
        .part("attachment", big);
    let resp = client
        .post(format!("{console}/tickets"))
        .multipart(form)
        .send()
        .await
        .expect("create");

    // The form re-renders with the size message; no server error, no
    // backend call.
    assert!(resp.status().is_success(), "{}", resp.status());
    let body = resp.text().await.expect("body");
    assert!(body.contains("Attachment must be 16 MB or smaller"), "{body}");
    assert_eq!(backend.with_record(|r| r.create_ticket_calls), 0);
}

#[tokio::test]
async fn queue_tabs_keep_the_active_filters() {
    let (_backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "agent").await;

    let resp = client
        .get(format!("{console}/tickets?status=open&search=printer"))
        .send()
        .await
        .expect("tickets");
    let body = resp.text().await.expect("body");
    // The queue tab links carry the rest of the filter state along.
    assert!(
        body.contains("status=open&amp;queue=my_tickets"),
        "{body}"
    );
}

#[tokio::test]
async fn valid_submission_redirects_to_the_new_ticket() {
    let (backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "enduser").await;

    let form = reqwest::multipart::Form::new()
        .text("subject", "Printer is on fire")
        .text("description", "It is literally on fire.")
        .text("category_id", "1")
        .text("priority", "urgent");
    let resp = client
        .post(format!("{console}/tickets"))
        .multipart(form)
        .send()
        .await
        .expect("create");
    assert_eq!(location(&resp), Some("/tickets/7".to_owned()));
    assert_eq!(backend.with_record(|r| r.create_ticket_calls), 1);
}

#[tokio::test]
async fn status_change_shows_the_value_the_backend_recorded() {
    let (backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "agent").await;

    let resp = client
        .post(format!("{console}/tickets/7/status"))
        .form(&[("status", "resolved")])
        .send()
        .await
        .expect("status change");
    assert_eq!(location(&resp), Some("/tickets/7".to_owned()));

    // The backend received only the changed field.
    let update = backend.with_record(|r| r.last_ticket_update.clone());
    assert_eq!(update, Some(serde_json::json!({ "status": "resolved" })));

    // The re-fetched page shows whatever the backend now holds.
    let resp = client
        .get(format!("{console}/tickets/7"))
        .send()
        .await
        .expect("detail");
    let body = resp.text().await.expect("body");
    assert!(body.contains("Resolved"), "{body}");
}

#[tokio::test]
async fn detail_page_shows_the_backend_held_status() {
    let (backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "enduser").await;

    // The status changed behind the console's back; the page must show it
    // anyway, because every render re-fetches.
    backend.with_record(|r| r.ticket_status = Some("closed".to_owned()));

    let resp = client
        .get(format!("{console}/tickets/7"))
        .send()
        .await
        .expect("detail");
    let body = resp.text().await.expect("body");
    assert!(body.contains("Closed"), "{body}");
}

#[tokio::test]
async fn end_users_cannot_post_a_status_change() {
    let (backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "enduser").await;

    let resp = client
        .post(format!("{console}/tickets/7/status"))
        .form(&[("status", "closed")])
        .send()
        .await
        .expect("status change");
    assert_eq!(location(&resp), Some("/dashboard".to_owned()));
    assert_eq!(backend.with_record(|r| r.last_ticket_update.clone()), None);
}

#[tokio::test]
async fn end_users_get_no_comment_form_on_other_peoples_tickets() {
    let (_backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "enduser").await;

    // Ticket 8 belongs to the agent; the end user can read it but not
    // comment on it.
    let resp = client
        .get(format!("{console}/tickets/8"))
        .send()
        .await
        .expect("detail");
    let body = resp.text().await.expect("body");
    assert!(body.contains("Keyboard missing keys"));
    assert!(!body.contains("Post comment"), "{body}");
    assert!(body.contains("Only the requester and support staff"));
}

#[tokio::test]
async fn agents_can_comment_on_any_ticket() {
    let (_backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "agent").await;

    // Ticket 7 belongs to the end user, but agents comment everywhere.
    let resp = client
        .get(format!("{console}/tickets/7"))
        .send()
        .await
        .expect("detail");
    let body = resp.text().await.expect("body");
    assert!(body.contains("Post comment"), "{body}");
}

#[tokio::test]
async fn blank_comments_are_rejected_without_a_backend_call() {
    let (_backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "enduser").await;

    let resp = client
        .post(format!("{console}/tickets/7/comments"))
        .form(&[("content", "   ")])
        .send()
        .await
        .expect("comment");
    let redirect = location(&resp).expect("redirect");
    assert!(redirect.starts_with("/tickets/7?error="), "{redirect}");
}
