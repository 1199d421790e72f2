// File: tests/client_http.rs
use chrono::NaiveDate;
use mockito::{Matcher, Server};
use paperplan::PlannerError;
use paperplan::client::auth::{GoogleToken, TokenStore};
use paperplan::client::{EventSource, GoogleCalendarClient, HttpClient, TaskSource, TodoistClient};
use paperplan::model::EventTime;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn token(server_url: &str, access: &str) -> GoogleToken {
    GoogleToken {
        token: access.to_string(),
        refresh_token: Some("refresh-me".to_string()),
        token_uri: format!("{}/token", server_url),
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        scopes: vec!["https://www.googleapis.com/auth/calendar.readonly".to_string()],
        expiry: None,
    }
}

#[tokio::test]
async fn todoist_asks_for_tasks_due_on_the_day() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/tasks")
        .match_query(Matcher::UrlEncoded(
            "filter".to_string(),
            "due: 2026-03-05".to_string(),
        ))
        .match_header("authorization", "Bearer todo-token")
        .with_status(200)
        .with_body(
            r#"[
                {"id":"1","content":"Team Sync","priority":4,"labels":["30min"],"due":{"date":"2026-03-05"}},
                {"id":"2","content":"Pay rent","due":{"date":"2026-03-05T09:00:00"}}
            ]"#,
        )
        .create_async()
        .await;

    let client = TodoistClient::new(HttpClient::new().unwrap(), &server.url(), "todo-token");
    let tasks = client.tasks_due_on(day(2026, 3, 5)).await.unwrap();

    mock.assert_async().await;
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].content, "Team Sync");
    assert_eq!(tasks[0].priority, 4);
    assert_eq!(tasks[0].labels, vec!["30min".to_string()]);
    assert_eq!(tasks[1].priority, 1, "missing priority defaults to 1");
    assert_eq!(tasks[1].due, Some(day(2026, 3, 5)));
}

#[tokio::test]
async fn todoist_server_error_is_upstream() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/tasks")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let client = TodoistClient::new(HttpClient::new().unwrap(), &server.url(), "t");
    let err = client.all_tasks(None).await.unwrap_err();
    assert!(matches!(err, PlannerError::Upstream { .. }), "got {:?}", err);
}

#[tokio::test]
async fn calendar_refreshes_once_after_401() {
    let mut server = Server::new_async().await;
    let url = server.url();

    let rejected = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer stale")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/token")
        .match_body(Matcher::Regex("grant_type=refresh_token".to_string()))
        .with_status(200)
        .with_body(r#"{"access_token":"fresh","expires_in":3600}"#)
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer fresh")
        .with_status(200)
        .with_body(
            r#"{"items":[
                {"id":"e1","summary":"Dentist",
                 "start":{"dateTime":"2026-03-03T14:00:00-05:00"},
                 "end":{"dateTime":"2026-03-03T15:30:00-05:00"}}
            ]}"#,
        )
        .create_async()
        .await;

    let tokens = TokenStore::in_memory(token(&url, "stale"));
    let client = GoogleCalendarClient::new(HttpClient::new().unwrap(), &url, tokens);
    let events = client.events_on_day(day(2026, 3, 3)).await.unwrap();

    rejected.assert_async().await;
    refresh.assert_async().await;
    accepted.assert_async().await;
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].start,
        EventTime::Timed(day(2026, 3, 3).and_hms_opt(14, 0, 0).unwrap()),
        "local wall-clock time is kept"
    );
}

async fn refreshed_expiry(expires_in: &str) -> chrono::Duration {
    let mut server = Server::new_async().await;
    let url = server.url();
    let _refresh = server
        .mock("POST", "/token")
        .with_status(200)
        .with_body(format!(r#"{{"access_token":"fresh","expires_in":{}}}"#, expires_in))
        .create_async()
        .await;

    let tokens = TokenStore::in_memory(token(&url, "stale"));
    tokens.refresh(&HttpClient::new().unwrap()).await.unwrap();
    assert_eq!(tokens.access_token(), "fresh");
    assert!(!tokens.needs_refresh());
    tokens.expiry().unwrap() - chrono::Utc::now()
}

#[tokio::test]
async fn absurd_token_lifetime_falls_back_to_an_hour() {
    // Beyond what a duration can hold, then beyond the last representable date.
    for expires_in in ["9223372036854775807", "9000000000000000"] {
        let remaining = refreshed_expiry(expires_in).await;
        assert!(remaining <= chrono::Duration::hours(1), "{}", expires_in);
        assert!(remaining > chrono::Duration::minutes(59), "{}", expires_in);
    }

    let remaining = refreshed_expiry("120").await;
    assert!(remaining <= chrono::Duration::minutes(2));
}

#[tokio::test]
async fn calendar_second_401_is_auth_error() {
    let mut server = Server::new_async().await;
    let url = server.url();

    let _events = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Any)
        .with_status(401)
        .expect(2)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/token")
        .with_status(200)
        .with_body(r#"{"access_token":"still-bad"}"#)
        .expect(1)
        .create_async()
        .await;

    let tokens = TokenStore::in_memory(token(&url, "stale"));
    let client = GoogleCalendarClient::new(HttpClient::new().unwrap(), &url, tokens);
    let err = client
        .events_in_range(day(2026, 3, 1), day(2026, 3, 31), "primary")
        .await
        .unwrap_err();

    refresh.assert_async().await;
    assert!(err.is_auth(), "got {:?}", err);
}

#[tokio::test]
async fn calendar_follows_page_tokens() {
    let mut server = Server::new_async().await;
    let url = server.url();

    let first = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Regex("orderBy=startTime$".to_string()))
        .with_status(200)
        .with_body(
            r#"{"items":[{"id":"a","summary":"Holiday party","start":{"date":"2026-12-18"},"end":{"date":"2026-12-19"}}],
                "nextPageToken":"p2"}"#,
        )
        .create_async()
        .await;
    let second = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::UrlEncoded("pageToken".to_string(), "p2".to_string()))
        .with_status(200)
        .with_body(
            r#"{"items":[
                {"id":"b","start":{"dateTime":"2026-12-20T09:00:00Z"},"end":{"dateTime":"2026-12-20T10:00:00Z"}},
                {"id":"c","summary":"No start","start":{},"end":{}}
            ]}"#,
        )
        .create_async()
        .await;

    let tokens = TokenStore::in_memory(token(&url, "ok"));
    let client = GoogleCalendarClient::new(HttpClient::new().unwrap(), &url, tokens);
    let events = client
        .events_in_range(day(2026, 12, 1), day(2026, 12, 31), "primary")
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(events.len(), 2, "events without a start are skipped");
    assert!(events[0].is_all_day());
    assert_eq!(events[1].summary, "", "missing titles are left to the caller");
}
