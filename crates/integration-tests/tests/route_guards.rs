//! Route guard behavior: anonymous visitors land on the login page,
//! under-privileged users land on the dashboard, and authenticated users
//! are steered away from the auth pages.

use helpdesk_integration_tests::{client, location, login, spawn_stack};

#[tokio::test]
async fn anonymous_requests_redirect_to_login() {
    let (_backend, console) = spawn_stack().await;
    let client = client();

    for path in ["/dashboard", "/tickets", "/tickets/new", "/profile", "/admin/users"] {
        let resp = client
            .get(format!("{console}{path}"))
            .send()
            .await
            .expect("request");
        assert!(
            resp.status().is_redirection(),
            "{path} should redirect, got {}",
            resp.status()
        );
        assert_eq!(location(&resp), Some("/login".to_owned()), "for {path}");
    }
}

#[tokio::test]
async fn end_users_cannot_reach_admin_pages() {
    let (_backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "enduser").await;

    for path in ["/admin/users", "/admin/categories", "/admin/categories/new"] {
        let resp = client
            .get(format!("{console}{path}"))
            .send()
            .await
            .expect("request");
        assert_eq!(location(&resp), Some("/dashboard".to_owned()), "for {path}");
    }
}

#[tokio::test]
async fn agents_cannot_reach_admin_pages() {
    let (_backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "agent").await;

    let resp = client
        .get(format!("{console}/admin/users"))
        .send()
        .await
        .expect("request");
    assert_eq!(location(&resp), Some("/dashboard".to_owned()));
}

#[tokio::test]
async fn admins_can_reach_admin_pages() {
    let (_backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "admin").await;

    for path in ["/admin/users", "/admin/categories"] {
        let resp = client
            .get(format!("{console}{path}"))
            .send()
            .await
            .expect("request");
        assert!(resp.status().is_success(), "for {path}: {}", resp.status());
    }
}

#[tokio::test]
async fn authenticated_users_are_steered_away_from_auth_pages() {
    let (_backend, console) = spawn_stack().await;
    let client = client();
    login(&client, &console, "enduser").await;

    for path in ["/login", "/register"] {
        let resp = client
            .get(format!("{console}{path}"))
            .send()
            .await
            .expect("request");
        assert_eq!(location(&resp), Some("/dashboard".to_owned()), "for {path}");
    }
}

#[tokio::test]
async fn health_and_root() {
    let (_backend, console) = spawn_stack().await;
    let client = client();

    let resp = client
        .get(format!("{console}/health"))
        .send()
        .await
        .expect("health");
    assert!(resp.status().is_success());

    let resp = client.get(&console).send().await.expect("root");
    assert_eq!(location(&resp), Some("/dashboard".to_owned()));
}
