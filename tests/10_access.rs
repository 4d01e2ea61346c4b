mod common;

use anyhow::Result;
use reqwest::StatusCode;

use common::{json_body, location, TestApp};
use discover_api::types::Role;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.get("/health", None).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await?;
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn health_reports_store_outage() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.store.set_unavailable(true);

    let res = app.get("/health", None).await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn anonymous_visitor_is_sent_to_login_with_return_target() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.navigate("/my-businesses", None).await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res).as_deref(), Some("/login?redirect=/my-businesses"));

    // The login page hands the target back
    let res = app.navigate("/login?redirect=/my-businesses", None).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await?;
    assert_eq!(body["data"]["page"], "/login");
    assert_eq!(body["data"]["return_to"], "/my-businesses");
    Ok(())
}

#[tokio::test]
async fn anonymous_visitor_sees_public_pages() -> Result<()> {
    let app = TestApp::spawn().await?;

    for path in ["/", "/search?q=tacos", "/business/corner-bakery", "/signup"] {
        let res = app.navigate(path, None).await?;
        assert_eq!(res.status(), StatusCode::OK, "{}", path);
    }
    Ok(())
}

#[tokio::test]
async fn new_user_is_held_on_first_onboarding_step() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.new_user().await?;

    let res = app.navigate("/saved", Some(&user)).await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res).as_deref(), Some("/onboarding/interests"));

    // The step itself renders, no loop
    let res = app.navigate("/onboarding/interests", Some(&user)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn business_owner_is_kept_out_of_personal_pages() -> Result<()> {
    let app = TestApp::spawn().await?;
    let owner = app.business_owner().await?;

    let res = app.navigate("/profile", Some(&owner)).await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res).as_deref(), Some("/my-businesses"));

    let res = app.navigate("/my-businesses", Some(&owner)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn messaging_is_shared_across_contexts() -> Result<()> {
    let app = TestApp::spawn().await?;
    let owner = app.business_owner().await?;
    let user = app.onboarded_user().await?;

    for profile in [&owner, &user] {
        let res = app.navigate("/dm", Some(profile)).await?;
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await?;
        assert_eq!(body["data"]["class"], "messaging");
    }
    Ok(())
}

#[tokio::test]
async fn onboarded_user_is_kept_out_of_business_pages() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.onboarded_user().await?;

    let res = app.navigate("/my-businesses", Some(&user)).await?;
    assert_eq!(location(&res).as_deref(), Some("/home"));

    let res = app.navigate("/onboarding/interests", Some(&user)).await?;
    assert_eq!(location(&res).as_deref(), Some("/home"));

    let res = app.navigate("/home", Some(&user)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn signed_in_accounts_skip_login_page() -> Result<()> {
    let app = TestApp::spawn().await?;
    let owner = app.business_owner().await?;

    let res = app.navigate("/login", Some(&owner)).await?;
    assert_eq!(location(&res).as_deref(), Some("/my-businesses"));
    Ok(())
}

#[tokio::test]
async fn unclassified_paths_fail_closed() -> Result<()> {
    let app = TestApp::spawn().await?;
    let owner = app.business_owner().await?;
    let admin = app.admin().await?;

    let res = app.navigate("/no-such-page", Some(&owner)).await?;
    assert_eq!(location(&res).as_deref(), Some("/my-businesses"));

    let res = app.navigate("/no-such-page", Some(&admin)).await?;
    assert_eq!(location(&res).as_deref(), Some("/admin"));

    let res = app.navigate("/no-such-page", None).await?;
    assert_eq!(location(&res).as_deref(), Some("/login?redirect=/no-such-page"));
    Ok(())
}

#[tokio::test]
async fn api_denials_are_json_not_redirects() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.get("/api/owner/businesses", None).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(res).await?;
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["redirect"], "/login?redirect=/api/owner/businesses");

    let user = app.onboarded_user().await?;
    let res = app.get("/api/owner/businesses", Some(&user)).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = json_body(res).await?;
    assert_eq!(body["redirect"], "/home");
    Ok(())
}

#[tokio::test]
async fn garbage_session_is_treated_as_anonymous() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .client
        .get(app.url("/profile"))
        .header(reqwest::header::COOKIE, "access_token=not-a-jwt")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res).as_deref(), Some("/login?redirect=/profile"));
    Ok(())
}

#[tokio::test]
async fn valid_session_without_profile_is_anonymous() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.token_for(uuid::Uuid::new_v4());

    let res = app.client.get(app.url("/api/me")).bearer_auth(token).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn profile_lookup_failure_fails_closed() -> Result<()> {
    let app = TestApp::spawn().await?;
    let owner = app.seed_profile(Role::BusinessOwner, 0).await?;
    app.store.set_unavailable(true);

    let res = app.navigate("/my-businesses", Some(&owner)).await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res).as_deref(), Some("/login?redirect=/my-businesses"));
    Ok(())
}

#[tokio::test]
async fn role_change_applies_on_next_request() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.onboarded_user().await?;

    let res = app.navigate("/my-businesses", Some(&user)).await?;
    assert_eq!(location(&res).as_deref(), Some("/home"));

    let admin = app.admin().await?;
    let res = app
        .authed(reqwest::Method::PUT, &format!("/api/admin/profiles/{}/role", user.id), &admin)
        .json(&serde_json::json!({ "role": "business_owner" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.navigate("/my-businesses", Some(&user)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
