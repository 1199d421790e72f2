// File: src/client/gcal.rs
use crate::client::EventSource;
use crate::client::auth::TokenStore;
use crate::client::core::{HttpClient, HttpResponse, join_url, status_error};
use crate::error::{PlannerError, PlannerResult};
use crate::model::{CalendarEvent, EventTime};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use http::StatusCode;
use serde::Deserialize;
use url::Url;

pub const GOOGLE_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";
const SERVICE: &str = "google-calendar";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEventTime {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    date_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    start: RawEventTime,
    end: RawEventTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<RawEvent>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Resolves a Google `start`/`end` object. `dateTime` wins over `date`;
/// timed values keep the wall-clock time of their own offset.
fn parse_event_time(raw: &RawEventTime) -> Option<EventTime> {
    if let Some(dt) = &raw.date_time {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(dt) {
            return Some(EventTime::Timed(parsed.naive_local()));
        }
        return NaiveDateTime::parse_from_str(dt, "%Y-%m-%dT%H:%M:%S")
            .ok()
            .map(EventTime::Timed);
    }
    raw.date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .map(EventTime::AllDay)
}

impl RawEvent {
    fn into_event(self) -> Option<CalendarEvent> {
        let start = parse_event_time(&self.start)?;
        let end = parse_event_time(&self.end).unwrap_or(start);
        Some(CalendarEvent {
            id: self.id,
            summary: self.summary.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            start,
            end,
        })
    }
}

/// Google Calendar v3 event source.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    http: HttpClient,
    base_url: String,
    tokens: TokenStore,
}

impl GoogleCalendarClient {
    pub fn new(http: HttpClient, base_url: &str, tokens: TokenStore) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            tokens,
        }
    }

    /// GET with a single refresh-and-retry on 401.
    async fn authorized_get(&self, url: &Url) -> PlannerResult<HttpResponse> {
        if self.tokens.needs_refresh() {
            self.tokens.refresh(&self.http).await?;
        }

        let token = self.tokens.access_token();
        let response = self.http.get(SERVICE, url, Some(&token)).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        log::error!("Authentication failed. Token may be revoked or expired.");
        log::info!("Attempting to re-authenticate...");
        self.tokens.refresh(&self.http).await?;

        let token = self.tokens.access_token();
        let retried = self.http.get(SERVICE, url, Some(&token)).await?;
        if retried.status == StatusCode::UNAUTHORIZED {
            return Err(PlannerError::auth(
                SERVICE,
                "access token rejected after refresh",
            ));
        }
        Ok(retried)
    }
}

impl EventSource for GoogleCalendarClient {
    async fn events_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        calendar_id: &str,
    ) -> PlannerResult<Vec<CalendarEvent>> {
        let time_min = format!("{}T00:00:00Z", start.format("%Y-%m-%d"));
        let time_max = format!("{}T23:59:59Z", end.format("%Y-%m-%d"));

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = join_url(SERVICE, &self.base_url, &["calendars", calendar_id, "events"])?;
            {
                let mut query = url.query_pairs_mut();
                query
                    .append_pair("timeMin", &time_min)
                    .append_pair("timeMax", &time_max)
                    .append_pair("singleEvents", "true")
                    .append_pair("orderBy", "startTime");
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let response = self.authorized_get(&url).await?;
            if !response.is_success() {
                log::error!("An error occurred: {}", response.status);
                return Err(status_error(SERVICE, &response));
            }

            let page: EventsPage = response
                .json()
                .map_err(|e| PlannerError::upstream(SERVICE, format!("unexpected payload: {}", e)))?;

            for raw in page.items {
                let id = raw.id.clone();
                match raw.into_event() {
                    Some(event) => events.push(event),
                    None => log::warn!("Skipping event '{}' without a usable start", id),
                }
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        log::debug!(
            "{} returned {} event(s) for {}..={}",
            calendar_id,
            events.len(),
            start,
            end
        );
        Ok(events)
    }
}
