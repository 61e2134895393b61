use super::{Settings, SettingsBackend};
use crate::error::BackendError;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use url::Url;

/// Settings persisted behind `{base}/api/settings`
pub struct HttpSettingsBackend {
    endpoint: Url,
    client: reqwest::Client,
    token: Option<String>,
}

impl HttpSettingsBackend {
    pub fn new(base: &Url, token: Option<String>) -> Result<Self, url::ParseError> {
        let mut endpoint = base.clone();
        endpoint
            .path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["api", "settings"]);
        Ok(Self {
            endpoint,
            client: reqwest::Client::new(),
            token,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request(&self, method: Method) -> RequestBuilder {
        let request = self.client.request(method, self.endpoint.clone());
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn check(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl SettingsBackend for HttpSettingsBackend {
    async fn settings(&self) -> Result<Settings, BackendError> {
        let response = check(self.request(Method::GET).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn update(&self, settings: &Settings) -> Result<Settings, BackendError> {
        let response = check(self.request(Method::PUT).json(settings).send().await?).await?;
        Ok(response.json().await?)
    }
}
