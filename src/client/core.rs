// File: src/client/core.rs
use crate::error::{PlannerError, PlannerResult};

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{Method, Request, StatusCode, Uri};
use http_body_util::BodyExt;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use url::Url;

type HttpsClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, String>;

/// Buffered response: status plus the full body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Thin HTTPS client shared by the REST collaborators.
#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: HttpsClient,
}

impl HttpClient {
    pub fn new() -> PlannerResult<Self> {
        let mut root_store = rustls::RootCertStore::empty();
        let result = rustls_native_certs::load_native_certs();
        let (added, _ignored) = root_store.add_parsable_certificates(result.certs);
        if added == 0 {
            // Plain http endpoints (local mocks, proxies) still work.
            log::warn!("No valid system certificates found; HTTPS requests will fail");
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let https_connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        let inner = Client::builder(TokioExecutor::new()).build(https_connector);
        Ok(Self { inner })
    }

    /// Sends `req` and buffers the response. Transport failures are reported
    /// as upstream errors of `service`; HTTP status handling is left to the
    /// caller.
    pub async fn send(&self, service: &str, req: Request<String>) -> PlannerResult<HttpResponse> {
        let uri = req.uri().clone();
        log::debug!("{} {} {}", service, req.method(), uri.path());

        let response = self
            .inner
            .request(req)
            .await
            .map_err(|e| PlannerError::upstream(service, format!("request to {} failed: {}", uri, e)))?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| PlannerError::upstream(service, format!("reading body failed: {}", e)))?
            .to_bytes()
            .to_vec();

        Ok(HttpResponse { status, body })
    }

    pub async fn get(
        &self,
        service: &str,
        url: &Url,
        bearer: Option<&str>,
    ) -> PlannerResult<HttpResponse> {
        let mut builder = Request::builder()
            .method(Method::GET)
            .uri(to_uri(service, url)?)
            .header(ACCEPT, "application/json");
        if let Some(token) = bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = builder
            .body(String::new())
            .map_err(|e| PlannerError::upstream(service, e.to_string()))?;
        self.send(service, req).await
    }

    pub async fn post_form(
        &self,
        service: &str,
        url: &Url,
        form: &[(&str, &str)],
    ) -> PlannerResult<HttpResponse> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();
        let req = Request::builder()
            .method(Method::POST)
            .uri(to_uri(service, url)?)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .map_err(|e| PlannerError::upstream(service, e.to_string()))?;
        self.send(service, req).await
    }
}

fn to_uri(service: &str, url: &Url) -> PlannerResult<Uri> {
    url.as_str()
        .parse::<Uri>()
        .map_err(|e| PlannerError::upstream(service, format!("invalid url {}: {}", url, e)))
}

/// Maps a non-success status to the error taxonomy.
pub fn status_error(service: &str, response: &HttpResponse) -> PlannerError {
    let body: String = response.text().chars().take(200).collect();
    if response.status == StatusCode::UNAUTHORIZED {
        PlannerError::auth(service, format!("{}: {}", response.status, body))
    } else {
        PlannerError::upstream(service, format!("{}: {}", response.status, body))
    }
}

/// Joins path segments onto a base url, keeping any base path.
pub fn join_url(service: &str, base: &str, segments: &[&str]) -> PlannerResult<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| PlannerError::Config(format!("invalid {} url '{}': {}", service, base, e)))?;
    url.path_segments_mut()
        .map_err(|_| PlannerError::Config(format!("{} url cannot be a base: {}", service, base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
