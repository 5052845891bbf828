use std::time::Duration;

#[cfg(feature = "network")]
use tracing::{debug, warn};

use crate::api::RepositoryService;
use crate::api::error::{ApiError, Result};
use crate::api::types::{ExtensionSelection, FileItem, Repository, RepositoryPreview};
#[cfg(feature = "network")]
use crate::api::types::{
    CreateRepositoryBody, CreateRepositoryParams, FileStatus, UpdateFileItemBody,
    UpdateFileItemParams,
};

/// Blocking JSON client for the repository/file data service. Every request
/// carries the bearer token and a JSON content type.
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    #[cfg(feature = "network")]
    http: reqwest::blocking::Client,
}

impl ApiClient {
    #[cfg(feature = "network")]
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .timeout(timeout)
            .user_agent(concat!("repotype/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            http,
        })
    }

    #[cfg(not(feature = "network"))]
    pub fn new(base_url: &str, token: Option<String>, _timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    #[cfg(feature = "network")]
    fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<T> {
        let mut request = request.header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().inspect_err(|err| warn!(%err, "request failed"))?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "response");
        if status.is_success() {
            Ok(response.json::<T>()?)
        } else {
            let body = response.text().unwrap_or_default();
            Err(ApiError::from_response(status.as_u16(), &body))
        }
    }

    #[cfg(not(feature = "network"))]
    fn disabled<T>(&self) -> Result<T> {
        let _ = &self.token;
        Err(ApiError::Network("built without network support".to_string()))
    }
}

#[cfg(feature = "network")]
impl RepositoryService for ApiClient {
    fn get_repository(&self, id: u64) -> Result<Repository> {
        self.send(self.http.get(self.url(&format!("/api/repositories/{id}"))))
    }

    fn get_file_item(&self, repository_id: u64, file_item_id: u64) -> Result<FileItem> {
        let path = format!("/api/repositories/{repository_id}/file_items/{file_item_id}");
        self.send(self.http.get(self.url(&path)))
    }

    fn mark_file_typed(&self, repository_id: u64, file_item_id: u64) -> Result<Vec<FileItem>> {
        let path = format!("/api/repositories/{repository_id}/file_items/{file_item_id}");
        let body = UpdateFileItemBody {
            file_item: UpdateFileItemParams {
                status: FileStatus::Typed,
            },
        };
        self.send(self.http.patch(self.url(&path)).json(&body))
    }

    fn preview_repository(&self, url: &str) -> Result<RepositoryPreview> {
        let endpoint = reqwest::Url::parse_with_params(
            &self.url("/api/repositories/preview"),
            &[("url", url)],
        )
        .map_err(|err| ApiError::Unexpected(format!("invalid API URL: {err}")))?;
        self.send(self.http.get(endpoint))
    }

    fn create_repository(
        &self,
        url: &str,
        extensions: Option<&[ExtensionSelection]>,
    ) -> Result<Repository> {
        let body = CreateRepositoryBody {
            repository: CreateRepositoryParams { url, extensions },
        };
        self.send(self.http.post(self.url("/api/repositories")).json(&body))
    }
}

#[cfg(not(feature = "network"))]
impl RepositoryService for ApiClient {
    fn get_repository(&self, _id: u64) -> Result<Repository> {
        self.disabled()
    }

    fn get_file_item(&self, _repository_id: u64, _file_item_id: u64) -> Result<FileItem> {
        self.disabled()
    }

    fn mark_file_typed(&self, _repository_id: u64, _file_item_id: u64) -> Result<Vec<FileItem>> {
        self.disabled()
    }

    fn preview_repository(&self, _url: &str) -> Result<RepositoryPreview> {
        self.disabled()
    }

    fn create_repository(
        &self,
        _url: &str,
        _extensions: Option<&[ExtensionSelection]>,
    ) -> Result<Repository> {
        self.disabled()
    }
}
