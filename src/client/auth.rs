// File: src/client/auth.rs
// OAuth access-token bookkeeping for the Google Calendar source.
//
// Only the refresh grant is implemented. Obtaining the first token (the
// browser consent flow) happens outside this tool; the token file uses the
// "authorized user" JSON layout written by Google's client libraries.
use crate::client::core::{HttpClient, status_error};
use crate::error::{PlannerError, PlannerResult};
use crate::storage::LocalStorage;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use url::Url;

const SERVICE: &str = "google-oauth";
/// Lifetime assumed when the server's `expires_in` is unusable.
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleToken {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl GoogleToken {
    pub fn load(path: &Path) -> PlannerResult<Self> {
        if !path.exists() {
            return Err(PlannerError::auth(
                SERVICE,
                format!(
                    "token file '{}' not found; authorize the calendar and place the token there",
                    path.display()
                ),
            ));
        }
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| {
            PlannerError::auth(SERVICE, format!("unreadable token file '{}': {}", path.display(), e))
        })
    }

    pub fn save(&self, path: &Path) -> PlannerResult<()> {
        LocalStorage::with_lock(path, || {
            let json = serde_json::to_string_pretty(self)?;
            LocalStorage::atomic_write(path, json)?;
            Ok(())
        })?;
        Ok(())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|e| e <= now)
    }
}

/// Holds the current access token and knows how to refresh it.
#[derive(Debug)]
pub struct TokenStore {
    path: Option<PathBuf>,
    token: Mutex<GoogleToken>,
}

impl TokenStore {
    pub fn load(path: &Path) -> PlannerResult<Self> {
        let token = GoogleToken::load(path)?;
        log::info!("Loaded existing credentials from {}", path.display());
        Ok(Self {
            path: Some(path.to_path_buf()),
            token: Mutex::new(token),
        })
    }

    /// In-memory store; refreshed tokens are not persisted.
    pub fn in_memory(token: GoogleToken) -> Self {
        Self {
            path: None,
            token: Mutex::new(token),
        }
    }

    fn snapshot(&self) -> GoogleToken {
        match self.token.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn access_token(&self) -> String {
        self.snapshot().token
    }

    pub fn needs_refresh(&self) -> bool {
        self.snapshot().is_expired(Utc::now())
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.snapshot().expiry
    }

    /// Exchanges the refresh token for a new access token.
    pub async fn refresh(&self, http: &HttpClient) -> PlannerResult<()> {
        let current = self.snapshot();
        let refresh_token = current.refresh_token.clone().ok_or_else(|| {
            PlannerError::auth(SERVICE, "access token rejected and no refresh token available")
        })?;

        log::info!("Access token expired, refreshing...");
        let url = Url::parse(&current.token_uri)
            .map_err(|e| PlannerError::Config(format!("invalid token_uri: {}", e)))?;
        let response = http
            .post_form(
                SERVICE,
                &url,
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token.as_str()),
                    ("client_id", current.client_id.as_str()),
                    ("client_secret", current.client_secret.as_str()),
                ],
            )
            .await?;

        if !response.is_success() {
            // Any rejection of the refresh grant means the credentials are gone.
            let err = status_error(SERVICE, &response);
            return Err(PlannerError::auth(SERVICE, err.to_string()));
        }

        let parsed: RefreshResponse = response
            .json()
            .map_err(|e| PlannerError::auth(SERVICE, format!("unexpected refresh payload: {}", e)))?;

        let mut updated = current;
        updated.token = parsed.access_token;
        updated.expiry = parsed.expires_in.map(expiry_after);

        if let Some(path) = &self.path
            && let Err(e) = updated.save(path)
        {
            log::error!("Failed to save credentials: {}", e);
        }

        match self.token.lock() {
            Ok(mut guard) => *guard = updated,
            Err(poisoned) => *poisoned.into_inner() = updated,
        }
        log::info!("Successfully refreshed access token");
        Ok(())
    }
}

/// Absolute expiry for an `expires_in` of `secs` seconds from now.
fn expiry_after(secs: i64) -> DateTime<Utc> {
    let now = Utc::now();
    let fallback = Duration::seconds(DEFAULT_TOKEN_TTL_SECS);
    let ttl = Duration::try_seconds(secs).unwrap_or_else(|| {
        log::warn!("Ignoring token lifetime of {} seconds", secs);
        fallback
    });
    now.checked_add_signed(ttl)
        .unwrap_or_else(|| now + fallback)
}
