//! Integration tests for the HTTP backend and the widget driving it,
//! run against a mock `/weather` endpoint.

use cityweather_core::{
    Config, Document, ElementId, FetchError, HttpBackend, LOGIN_REQUIRED_MESSAGE, Labels,
    Outcome, UiEvent, WeatherBackend, WeatherWidget,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path, query_param},
};

fn paris_body() -> serde_json::Value {
    serde_json::json!({
        "city": "Paris",
        "current_temp": 20,
        "current_pressure": 1012,
        "current_rain": 0,
        "tomorrow_min": 15,
        "tomorrow_max": 22,
        "hour_labels": ["10:00", "11:00"],
        "hour_temps": [20, 21]
    })
}

fn widget_for(server: &MockServer) -> WeatherWidget<HttpBackend, Document> {
    let labels = Labels::default();
    WeatherWidget::new(
        HttpBackend::new(server.uri()),
        Document::new(&labels.idle),
        labels,
    )
}

async fn mount_weather(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Session-gated endpoints shaped like the original backend: `/weather`
/// redirects to `/login` unless the `session=abc` cookie is sent, and a
/// correct login form redirects to `/` with that cookie set.
async fn mount_login_gate(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(header("cookie", "session=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_body()))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/login"))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("username=ana"))
        .and(body_string_contains("password=s3cret"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "/")
                .insert_header("Set-Cookie", "session=abc; Path=/; HttpOnly"),
        )
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form>Incorrect password.</form>"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form>Log in</form>"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>index</html>"))
        .mount(server)
        .await;
}

fn row_texts(doc: &Document) -> Vec<String> {
    doc.rows(ElementId::HourlyContainer)
        .iter()
        .map(ToString::to_string)
        .collect()
}

// ============================================================================
// Backend
// ============================================================================

#[tokio::test]
async fn fetch_parses_success_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("city", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_body()))
        .expect(1)
        .mount(&server)
        .await;

    let data = HttpBackend::new(server.uri())
        .fetch("Paris")
        .await
        .expect("success payload");

    assert_eq!(data.city, "Paris");
    assert_eq!(data.hour_labels, ["10:00", "11:00"]);
    assert_eq!(data.current_pressure.to_string(), "1012");
}

#[tokio::test]
async fn fetch_sends_percent_encoded_city() {
    let server = MockServer::start().await;
    mount_weather(&server, ResponseTemplate::new(200).set_body_json(paris_body())).await;

    HttpBackend::new(server.uri())
        .fetch("São Paulo")
        .await
        .expect("success payload");

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("city=S%C3%A3o%20Paulo"));
}

#[tokio::test]
async fn fetch_reports_backend_error_message() {
    let server = MockServer::start().await;
    mount_weather(
        &server,
        ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "City not found"})),
    )
    .await;

    let err = HttpBackend::new(server.uri())
        .fetch("Atlantis")
        .await
        .unwrap_err();

    match err {
        FetchError::Status { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message.as_deref(), Some("City not found"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_tolerates_non_json_error_body() {
    let server = MockServer::start().await;
    mount_weather(
        &server,
        ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"),
    )
    .await;

    let err = HttpBackend::new(server.uri()).fetch("Paris").await.unwrap_err();
    assert!(matches!(
        err,
        FetchError::Status {
            status: 502,
            message: None
        }
    ));
}

#[tokio::test]
async fn fetch_flags_malformed_success_body() {
    let server = MockServer::start().await;
    mount_weather(&server, ResponseTemplate::new(200).set_body_string("{not json")).await;

    let err = HttpBackend::new(server.uri()).fetch("Paris").await.unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
}

#[tokio::test]
async fn fetch_reports_unreachable_backend() {
    // Nothing listens on the discard port.
    let err = HttpBackend::new("http://127.0.0.1:9")
        .fetch("Paris")
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
}

#[tokio::test]
async fn configured_timeout_applies() {
    let server = MockServer::start().await;
    mount_weather(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(paris_body())
            .set_delay(std::time::Duration::from_secs(3)),
    )
    .await;

    let config = Config {
        base_url: server.uri(),
        timeout_secs: Some(1),
        ..Config::default()
    };
    let err = HttpBackend::from_config(&config)
        .expect("client builds")
        .fetch("Paris")
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test]
async fn fetch_without_session_reports_login_required() {
    let server = MockServer::start().await;
    mount_login_gate(&server).await;

    let err = HttpBackend::new(server.uri()).fetch("Paris").await.unwrap_err();
    assert!(matches!(err, FetchError::LoginRequired), "got {err:?}");
}

#[tokio::test]
async fn login_session_is_reused_for_weather() {
    let server = MockServer::start().await;
    mount_login_gate(&server).await;

    let backend = HttpBackend::new(server.uri());
    backend.login("ana", "s3cret").await.expect("login accepted");

    let data = backend.fetch("Paris").await.expect("session cookie sent");
    assert_eq!(data.city, "Paris");
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let server = MockServer::start().await;
    mount_login_gate(&server).await;

    let backend = HttpBackend::new(server.uri());
    let err = backend.login("ana", "guess").await.unwrap_err();
    assert!(matches!(err, FetchError::LoginRejected), "got {err:?}");

    let err = backend.fetch("Paris").await.unwrap_err();
    assert!(matches!(err, FetchError::LoginRequired), "got {err:?}");
}

#[tokio::test]
async fn widget_explains_missing_session() {
    let server = MockServer::start().await;
    mount_login_gate(&server).await;

    let widget = widget_for(&server);
    widget.set_input("Paris");
    let outcome = widget.handle(UiEvent::ButtonClick).await;
    assert_eq!(outcome, Outcome::Failed(LOGIN_REQUIRED_MESSAGE.into()));

    let doc = widget.into_view();
    assert_eq!(doc.text(ElementId::ErrorMessage), LOGIN_REQUIRED_MESSAGE);
    assert!(doc.is_hidden(ElementId::WeatherContainer));
    assert!(!doc.is_disabled(ElementId::GetWeatherButton));
}

// ============================================================================
// Widget over HTTP
// ============================================================================

#[tokio::test]
async fn widget_renders_successful_response() {
    let server = MockServer::start().await;
    mount_weather(&server, ResponseTemplate::new(200).set_body_json(paris_body())).await;

    let widget = widget_for(&server);
    widget.set_input("Paris");
    assert_eq!(widget.handle(UiEvent::ButtonClick).await, Outcome::Rendered);

    let doc = widget.into_view();
    assert!(!doc.is_hidden(ElementId::WeatherContainer));
    assert!(doc.is_hidden(ElementId::ErrorMessage));
    assert_eq!(row_texts(&doc), ["10:00 / 20°C", "11:00 / 21°C"]);
    assert!(!doc.is_disabled(ElementId::GetWeatherButton));
    assert_eq!(doc.text(ElementId::GetWeatherButton), "Get Weather");
}

#[tokio::test]
async fn widget_shows_city_not_found() {
    let server = MockServer::start().await;
    mount_weather(
        &server,
        ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "City not found"})),
    )
    .await;

    let widget = widget_for(&server);
    widget.set_input("Atlantis");
    let outcome = widget.handle(UiEvent::KeyPress("Enter".into())).await;
    assert_eq!(outcome, Outcome::Failed("City not found".into()));

    let doc = widget.into_view();
    assert_eq!(doc.text(ElementId::ErrorMessage), "City not found");
    assert!(!doc.is_hidden(ElementId::ErrorMessage));
    assert!(doc.is_hidden(ElementId::WeatherContainer));
    assert_eq!(doc.text(ElementId::GetWeatherButton), "Get Weather");
}

#[tokio::test]
async fn widget_falls_back_without_error_field() {
    let server = MockServer::start().await;
    mount_weather(
        &server,
        ResponseTemplate::new(500).set_body_json(serde_json::json!({})),
    )
    .await;

    let widget = widget_for(&server);
    widget.set_input("Paris");
    widget.fetch_weather().await;

    widget.with_view(|doc| {
        assert_eq!(doc.text(ElementId::ErrorMessage), "Failed to fetch weather data");
        assert!(!doc.is_disabled(ElementId::GetWeatherButton));
    });
}

#[tokio::test]
async fn widget_skips_request_for_blank_input() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_body()))
        .expect(0)
        .mount(&server)
        .await;

    let widget = widget_for(&server);
    widget.set_input("   ");
    assert_eq!(widget.handle(UiEvent::ButtonClick).await, Outcome::Ignored);
}
