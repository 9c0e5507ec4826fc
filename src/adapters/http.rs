use crate::config::ClientConfig;
use crate::domain::model::{DeviceStatus, Entry, ProfileRecord, ServerStatus, Treatment};
use crate::domain::ports::{EntryTransport, RecordTransport, SnapshotSource};
use crate::utils::error::{Result, TrackError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use url::Url;

const API_SECRET_HEADER: &str = "api-secret";

/// HTTP implementation of the transport ports, backed by one explicit
/// `reqwest::Client` (and thus one connection pool) per instance.
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    api_secret: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        // Normalize to a trailing slash so joins append instead of
        // replacing the last path segment.
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            client: Client::new(),
            base_url: Url::parse(&base)?,
            api_secret: config.api_secret.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_secret {
            Some(secret) => request.header(API_SECRET_HEADER, secret),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(TrackError::Unauthorized);
        }
        let message = response.text().await.unwrap_or_default();
        Err(TrackError::HttpStatus {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        tracing::debug!("GET {}", url);
        let response = self.authorized(self.client.get(url)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

#[async_trait]
impl RecordTransport for HttpTransport {
    async fn update_treatment(&self, treatment: &Treatment) -> Result<()> {
        let url = self.endpoint("api/v1/treatments")?;
        tracing::debug!("PUT {} ({})", url, treatment.id);
        let response = self
            .authorized(self.client.put(url).json(treatment))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_treatment(&self, id: &str) -> Result<()> {
        let url = self.endpoint(&format!("api/v1/treatments/{}", id))?;
        tracing::debug!("DELETE {}", url);
        let response = self.authorized(self.client.delete(url)).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update_profile(&self, profile: &ProfileRecord) -> Result<()> {
        let url = self.endpoint("api/v1/profile")?;
        tracing::debug!("PUT {} ({})", url, profile.id);
        let response = self
            .authorized(self.client.put(url).json(profile))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl EntryTransport for HttpTransport {
    /// The entries endpoint echoes back the subset it accepted.
    async fn post_entries(&self, entries: &[Entry]) -> Result<Vec<Entry>> {
        let url = self.endpoint("api/v1/entries")?;
        tracing::debug!("POST {} ({} entries)", url, entries.len());
        let response = self
            .authorized(self.client.post(url).json(entries))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

#[async_trait]
impl SnapshotSource for HttpTransport {
    async fn fetch_status(&self) -> Result<ServerStatus> {
        self.get_json("api/v1/status").await
    }

    async fn fetch_device_statuses(&self) -> Result<Vec<DeviceStatus>> {
        self.get_json("api/v1/devicestatus").await
    }

    async fn fetch_profiles(&self) -> Result<Vec<ProfileRecord>> {
        self.get_json("api/v1/profile").await
    }

    async fn fetch_entries(&self) -> Result<Vec<Entry>> {
        self.get_json("api/v1/entries").await
    }

    async fn fetch_treatments(&self) -> Result<Vec<Treatment>> {
        self.get_json("api/v1/treatments").await
    }
}
