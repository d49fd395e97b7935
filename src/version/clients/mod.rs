//! Platform client implementations

pub mod bitbucket;
pub mod github;
pub mod gitlab;
pub mod sourceforge;

pub use bitbucket::BitbucketClient;
pub use github::GitHubClient;
pub use gitlab::GitLabClient;
pub use sourceforge::SourceForgeClient;

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::config::AuditConfig;
use crate::engine::types::Platform;
use crate::version::client::PlatformClient;
use crate::version::error::PlatformError;

/// User agent sent with every API request
const USER_AGENT: &str = "engine-audit";

/// Platform clients keyed by the platform they serve
pub type PlatformClients = HashMap<Platform, Arc<dyn PlatformClient>>;

/// Create one client per supported platform from the audit configuration
pub fn create_default_clients(config: &AuditConfig) -> PlatformClients {
    let endpoints = &config.endpoints;
    let clients: [Arc<dyn PlatformClient>; 5] = [
        Arc::new(GitHubClient::new(&endpoints.github, config.token.clone())),
        Arc::new(BitbucketClient::new(&endpoints.bitbucket)),
        Arc::new(GitLabClient::new(&endpoints.gitlab)),
        Arc::new(GitLabClient::self_hosted(&config.self_hosted_gitlab_url())),
        Arc::new(SourceForgeClient::new(
            &endpoints.sourceforge,
            config.scratch_dir.clone(),
            config.clone_depth,
        )),
    ];

    clients
        .into_iter()
        .map(|client| (client.platform(), client))
        .collect()
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .expect("Failed to create HTTP client")
}

/// Sends a request and decodes a JSON body, mapping HTTP failures to [`PlatformError`]
///
/// 404, 410 and 422 map to `NotFound`; GitHub answers 422 for unknown commit ids.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    resource: &str,
) -> Result<T, PlatformError> {
    let response = request.send().await?;
    let status = response.status();

    if matches!(
        status,
        StatusCode::NOT_FOUND | StatusCode::GONE | StatusCode::UNPROCESSABLE_ENTITY
    ) {
        return Err(PlatformError::NotFound(resource.to_string()));
    }

    let rate_limit_exhausted = response
        .headers()
        .get("x-ratelimit-remaining")
        .is_some_and(|v| v.as_bytes() == b"0");

    if status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && rate_limit_exhausted)
    {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        return Err(PlatformError::RateLimited {
            retry_after_secs: retry_after,
        });
    }

    if !status.is_success() {
        warn!("{} returned status {}", resource, status);
        return Err(PlatformError::InvalidResponse(format!(
            "Unexpected status: {}",
            status
        )));
    }

    response.json().await.map_err(|e| {
        warn!("Failed to parse response for {}: {}", resource, e);
        PlatformError::InvalidResponse(e.to_string())
    })
}
