//! TMDB API preflight check.

use super::CheckResult;
use crate::models::{ApiKey, Secret};
use crate::services::{CredentialStatus, MetadataService};

/// Check that TMDB accepts the configured key.
pub async fn check(metadata: &dyn MetadataService, api_key: Option<&Secret>) -> CheckResult {
    let Some(key) = ApiKey::resolve(api_key) else {
        return CheckResult::fail(
            "TMDB API",
            "API key not configured",
            "Set TMDB_API_KEY or tmdb.api_key in the config file",
        );
    };

    match metadata.test_credential(&key).await {
        Ok(CredentialStatus::Valid) => CheckResult::ok("TMDB API", "connected"),
        Ok(CredentialStatus::Invalid { reason }) => CheckResult::fail(
            "TMDB API",
            &format!("invalid API key ({})", reason),
            "Check your TMDB API key or read access token",
        ),
        Err(e) => CheckResult::fail(
            "TMDB API",
            &format!("connection failed: {}", e),
            "Check your network connection",
        ),
    }
}
