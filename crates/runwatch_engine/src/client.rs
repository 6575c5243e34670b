use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Response, StatusCode};
use runwatch_core::{Job, JobId, JobSummary};
use runwatch_logging::{monitor_debug, monitor_warn};
use serde::de::DeserializeOwned;

use crate::types::ErrorBody;
use crate::{CreateRunRequest, CreatedRun, FetchError, PublishError, PublishResponse};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Raw `Cookie` header value carrying the backend session.
    pub session_cookie: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            session_cookie: None,
        }
    }
}

/// Remote job resource. Implementations perform one network call per method
/// and have no other side effects.
#[async_trait::async_trait]
pub trait JobClient: Send + Sync {
    async fn fetch_job(&self, job_id: JobId) -> Result<Job, FetchError>;

    /// One-shot, non-idempotent: every call posts again.
    async fn publish(&self, job_id: JobId) -> Result<PublishResponse, PublishError>;

    /// `Ok(false)` when the backend rejects the session.
    async fn check_session(&self) -> Result<bool, FetchError>;

    async fn list_runs(&self, limit: usize) -> Result<Vec<JobSummary>, FetchError>;

    async fn create_run(&self, request: &CreateRunRequest) -> Result<CreatedRun, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestJobClient {
    inner: reqwest::Client,
    base_url: String,
}

impl ReqwestJobClient {
    pub fn new(settings: ClientSettings) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = settings.session_cookie.as_deref() {
            let value = HeaderValue::from_str(cookie)
                .map_err(|err| FetchError::Transport(format!("invalid session cookie: {err}")))?;
            headers.insert(COOKIE, value);
        }

        let inner = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        Ok(Self {
            inner,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl JobClient for ReqwestJobClient {
    async fn fetch_job(&self, job_id: JobId) -> Result<Job, FetchError> {
        let url = self.url(&format!("/api/runs/{job_id}"));
        monitor_debug!("GET {}", url);
        let response = self
            .inner
            .get(&url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    async fn publish(&self, job_id: JobId) -> Result<PublishResponse, PublishError> {
        let url = self.url(&format!("/api/runs/{job_id}/publish"));
        monitor_debug!("POST {}", url);
        let response = self
            .inner
            .post(&url)
            .send()
            .await
            .map_err(|err| PublishError::Transport(describe_reqwest_error(&err)))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<PublishResponse>()
                .await
                .map_err(|err| PublishError::Transport(format!("invalid publish response: {err}")));
        }

        let detail = error_detail(response).await;
        monitor_warn!("Publish of run {} answered {}: {:?}", job_id, status, detail);
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PublishError::Unauthorized,
            StatusCode::NOT_FOUND => PublishError::NotFound,
            _ if status.is_client_error() => {
                PublishError::Validation(detail.unwrap_or_else(|| status.to_string()))
            }
            _ => PublishError::Transport(detail.unwrap_or_else(|| status.to_string())),
        })
    }

    async fn check_session(&self) -> Result<bool, FetchError> {
        let url = self.url("/api/auth/me");
        monitor_debug!("GET {}", url);
        let response = self
            .inner
            .get(&url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(false),
            status => Err(FetchError::Transport(format!("HTTP {status}"))),
        }
    }

    async fn list_runs(&self, limit: usize) -> Result<Vec<JobSummary>, FetchError> {
        let url = self.url(&format!("/api/runs?limit={limit}"));
        monitor_debug!("GET {}", url);
        let response = self
            .inner
            .get(&url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    async fn create_run(&self, request: &CreateRunRequest) -> Result<CreatedRun, FetchError> {
        let url = self.url("/api/runs");
        monitor_debug!("POST {} instrument={}", url, request.instrument);
        let response = self
            .inner
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
    let status = response.status();
    match status {
        StatusCode::NOT_FOUND => return Err(FetchError::NotFound),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(FetchError::Unauthorized),
        _ if !status.is_success() => {
            let detail = error_detail(response).await;
            return Err(FetchError::Transport(match detail {
                Some(detail) => format!("HTTP {status}: {detail}"),
                None => format!("HTTP {status}"),
            }));
        }
        _ => {}
    }

    response
        .json::<T>()
        .await
        .map_err(|err| FetchError::Transport(format!("invalid response body: {err}")))
}

async fn error_detail(response: Response) -> Option<String> {
    let body = response.text().await.ok()?;
    serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.detail_text())
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    FetchError::Transport(describe_reqwest_error(&err))
}

fn describe_reqwest_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("timeout: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}
