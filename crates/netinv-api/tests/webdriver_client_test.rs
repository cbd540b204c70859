#![allow(clippy::unwrap_used)]
// Integration tests for the WebDriver client using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use netinv_api::{
    Browser, BrowserOptions, DriverLauncher, Error, Locator, PortalDriver, WebDriverClient,
    WebDriverLauncher, WebDriverSession,
};

const SESSION: &str = "4f2c9c6e-session";

// ── Helpers ─────────────────────────────────────────────────────────

fn session_path(suffix: &str) -> String {
    format!("/session/{SESSION}/{suffix}")
}

async fn setup() -> (MockServer, WebDriverSession) {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": { "sessionId": SESSION, "capabilities": { "browserName": "firefox" } }
        })))
        .mount(&server)
        .await;

    let client =
        WebDriverClient::with_client(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
    let launcher = WebDriverLauncher::new(client, BrowserOptions::default());
    let session = launcher.launch().await.unwrap();
    (server, session)
}

// ── Session lifecycle ───────────────────────────────────────────────

#[tokio::test]
async fn test_launch_sends_capabilities() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session"))
        .and(body_partial_json(json!({
            "capabilities": { "alwaysMatch": {
                "browserName": "firefox",
                "moz:firefoxOptions": { "args": ["-headless"] }
            }}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": { "sessionId": SESSION, "capabilities": {} }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        WebDriverClient::with_client(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
    let launcher = WebDriverLauncher::new(
        client,
        BrowserOptions {
            browser: Browser::Firefox,
            headless: true,
            accept_insecure_certs: false,
        },
    );
    let session = launcher.launch().await.unwrap();
    assert_eq!(session.session_id(), SESSION);
}

#[tokio::test]
async fn test_launch_failure_is_session_not_created() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "value": {
                "error": "session not created",
                "message": "Expected browser binary location"
            }
        })))
        .mount(&server)
        .await;

    let client =
        WebDriverClient::with_client(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
    let result = WebDriverLauncher::new(client, BrowserOptions::default())
        .launch()
        .await;

    match result {
        Err(Error::SessionNotCreated { message }) => {
            assert!(message.contains("browser binary"), "got: {message}");
        }
        other => panic!("expected SessionNotCreated, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_quit_is_idempotent_and_closes_session() {
    let (server, mut session) = setup().await;

    Mock::given(method("DELETE"))
        .and(path(format!("/session/{SESSION}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .expect(1)
        .mount(&server)
        .await;

    session.quit().await.unwrap();
    session.quit().await.unwrap();
    assert!(session.is_closed());

    let after = session.title().await;
    assert!(matches!(after, Err(Error::SessionClosed)), "got: {after:?}");
}

// ── Navigation & documents ──────────────────────────────────────────

#[tokio::test]
async fn test_navigate_and_read_page() {
    let (server, mut session) = setup().await;

    Mock::given(method("POST"))
        .and(path(session_path("url")))
        .and(body_json(json!({
            "url": "https://portal.example.edu/cgi-bin/netadmin.pl?span=ENG-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(session_path("title")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": " VLAN SUMMARY " })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(session_path("source")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": "<html><head><title> VLAN SUMMARY </title></head></html>"
        })))
        .mount(&server)
        .await;

    let url = Url::parse("https://portal.example.edu/cgi-bin/netadmin.pl?span=ENG-1").unwrap();
    session.navigate(&url).await.unwrap();

    assert_eq!(session.title().await.unwrap(), " VLAN SUMMARY ");
    assert!(session.page_source().await.unwrap().contains("<title>"));
}

// ── Elements & frames ───────────────────────────────────────────────

#[tokio::test]
async fn test_find_missing_element_maps_locator() {
    let (server, mut session) = setup().await;

    Mock::given(method("POST"))
        .and(path(session_path("element")))
        .and(body_json(json!({ "using": "css selector", "value": ".btn-cancel" })))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "value": { "error": "no such element", "message": "Unable to locate element" }
        })))
        .mount(&server)
        .await;

    let result = session.find(&Locator::class_name("btn-cancel")).await;

    match result {
        Err(Error::NoSuchElement { ref locator }) => assert_eq!(locator, "class=btn-cancel"),
        other => panic!("expected NoSuchElement, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_fill_click_and_frame_switch() {
    let (server, mut session) = setup().await;

    Mock::given(method("POST"))
        .and(path(session_path("element")))
        .and(body_json(json!({ "using": "css selector", "value": "#duo_iframe" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": { "element-6066-11e4-a52e-4f735466cecf": "frame-1" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(session_path("frame")))
        .and(body_json(json!({
            "id": { "element-6066-11e4-a52e-4f735466cecf": "frame-1" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(session_path("elements")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                { "element-6066-11e4-a52e-4f735466cecf": "btn-a" },
                { "element-6066-11e4-a52e-4f735466cecf": "btn-b" }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(session_path("element/btn-b/text")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": "Send Me a Push" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(session_path("element/btn-b/click")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(session_path("element/btn-b/value")))
        .and(body_json(json!({ "text": "netops" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(session_path("frame/parent")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .expect(1)
        .mount(&server)
        .await;

    let frame = session.find(&Locator::id("duo_iframe")).await.unwrap();
    session.enter_frame(&frame).await.unwrap();

    let buttons = session
        .find_all(&Locator::css("button.auth-button.positive"))
        .await
        .unwrap();
    assert_eq!(buttons.len(), 2);
    assert_eq!(session.text(&buttons[1]).await.unwrap(), "Send Me a Push");
    session.click(&buttons[1]).await.unwrap();
    session.send_keys(&buttons[1], "netops").await.unwrap();

    session.leave_frame().await.unwrap();
}

#[tokio::test]
async fn test_unparseable_error_body_is_still_webdriver_error() {
    let (server, mut session) = setup().await;

    Mock::given(method("GET"))
        .and(path(session_path("title")))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    match session.title().await {
        Err(Error::WebDriver { status, ref message, .. }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "Bad Gateway");
        }
        other => panic!("expected WebDriver error, got: {other:?}"),
    }
}
