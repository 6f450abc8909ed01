use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use tracing::debug;

use super::RemoteStore;
use crate::error::StoreError;
use crate::job::JobRecord;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// [`RemoteStore`] backed by the render API's JSON endpoints under `/projects`.
pub struct HttpStore {
    client: Client,
    base_url: Url,
}

impl HttpStore {
    pub fn new(api_url: impl AsRef<str>) -> Result<Self, StoreError> {
        let raw = api_url.as_ref().trim_end_matches('/');
        let base_url = Url::parse(raw)
            .map_err(|e| StoreError::Validation(format!("invalid api url `{raw}`: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Validation(format!(
                "api url `{raw}` cannot carry a path"
            )));
        }
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    // The id is pushed as one percent-encoded path segment.
    fn project_url(&self, id: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                StoreError::Validation(format!("api url `{}` cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .push("projects")
            .push(id);
        Ok(url)
    }

    async fn check(response: Response, id: &str) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());

        Err(match status {
            StatusCode::NOT_FOUND => StoreError::NotFound(id.to_string()),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                StoreError::Validation(body)
            }
            _ => StoreError::Unavailable(format!("status {}: {body}", status.as_u16())),
        })
    }
}

impl RemoteStore for HttpStore {
    async fn get(&self, id: &str) -> Result<JobRecord, StoreError> {
        debug!(job_id = %id, "fetching job record");
        let response = self.client.get(self.project_url(id)?).send().await?;
        let body = Self::check(response, id).await?.bytes().await?;
        serde_json::from_slice::<JobRecord>(&body)
            .map_err(|e| StoreError::Validation(format!("malformed record for `{id}`: {e}")))
    }

    async fn update(&self, record: &JobRecord) -> Result<(), StoreError> {
        let id = record
            .id
            .as_deref()
            .ok_or_else(|| StoreError::Validation("record has no id".to_string()))?;
        debug!(job_id = %id, state = ?record.state, "updating job record");
        let response = self
            .client
            .put(self.project_url(id)?)
            .json(record)
            .send()
            .await?;
        Self::check(response, id).await?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        debug!(job_id = %id, "removing job record");
        let response = self.client.delete(self.project_url(id)?).send().await?;
        Self::check(response, id).await?;
        Ok(())
    }
}
