//! Login and logout behavior, including the guarantee that logging out
//! clears the console session even when the backend call fails.

use helpdesk_integration_tests::{client, location, login, spawn_stack};

#[tokio::test]
async fn rejected_credentials_show_the_backend_message() {
    let (_backend, console) = spawn_stack().await;
    let client = client();

    let resp = client
        .post(format!("{console}/login"))
        .form(&[("username", "enduser"), ("password", "wrong")])
        .send()
        .await
        .expect("login request");
    assert!(resp.status().is_success());
    let body = resp.text().await.expect("body");
    // The backend's own message, verbatim.
    assert!(body.contains("Invalid username or password"), "{body}");
    // The username survives the round trip.
    assert!(body.contains("value=\"enduser\""));
}

#[tokio::test]
async fn successful_login_grants_access() {
    let (_backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "agent").await;

    let resp = client
        .get(format!("{console}/tickets"))
        .send()
        .await
        .expect("tickets");
    assert!(resp.status().is_success());
    let body = resp.text().await.expect("body");
    assert!(body.contains("Printer is on fire"));
}

#[tokio::test]
async fn logout_clears_the_session_even_when_the_backend_fails() {
    let (backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "enduser").await;
    backend.with_record(|r| r.fail_logout = true);

    let resp = client
        .post(format!("{console}/logout"))
        .send()
        .await
        .expect("logout");
    assert_eq!(location(&resp), Some("/login".to_owned()));
    assert_eq!(backend.with_record(|r| r.logout_calls), 1);

    // The console session is gone: protected pages bounce to login.
    let resp = client
        .get(format!("{console}/tickets"))
        .send()
        .await
        .expect("tickets");
    assert_eq!(location(&resp), Some("/login".to_owned()));
}

#[tokio::test]
async fn logout_calls_the_backend_once_on_the_happy_path() {
    let (backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "agent").await;

    let resp = client
        .post(format!("{console}/logout"))
        .send()
        .await
        .expect("logout");
    assert_eq!(location(&resp), Some("/login".to_owned()));
    assert_eq!(backend.with_record(|r| r.logout_calls), 1);
}
