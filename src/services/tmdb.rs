//! TMDB API client.

use crate::models::{ApiKey, Collection, Movie};
use crate::services::{CredentialStatus, MetadataService};
use crate::utils::title::year_from_date;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// TMDB client configuration.
#[derive(Debug, Clone)]
pub struct TmdbClientConfig {
    pub base_url: String,
    pub language: String,
    pub timeout: std::time::Duration,
}

impl Default for TmdbClientConfig {
    fn default() -> Self {
        Self {
            base_url: TMDB_BASE_URL.to_string(),
            language: "en-US".to_string(),
            timeout: std::time::Duration::from_secs(30),
        }
    }
}

/// TMDB API client.
///
/// Holds no credential: every call takes the [`ApiKey`] resolved for the run.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    config: TmdbClientConfig,
    client: reqwest::Client,
}

/// Error body TMDB sends with 4xx responses.
#[derive(Debug, Deserialize)]
struct StatusBody {
    status_message: Option<String>,
}

/// Movie search result.
#[derive(Debug, Deserialize)]
pub struct MovieSearchResult {
    pub results: Vec<MovieSearchItem>,
}

/// Movie search item.
#[derive(Debug, Deserialize)]
pub struct MovieSearchItem {
    pub id: u64,
    pub title: String,
    pub release_date: Option<String>,
}

/// Response of `/find/{external_id}`.
#[derive(Debug, Deserialize)]
pub struct FindResult {
    pub movie_results: Vec<MovieSearchItem>,
}

/// Movie details.
#[derive(Debug, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    pub imdb_id: Option<String>,
    pub title: String,
    pub release_date: Option<String>,
    pub belongs_to_collection: Option<CollectionRef>,
}

/// Collection reference embedded in movie details.
#[derive(Debug, Deserialize)]
pub struct CollectionRef {
    pub id: u64,
    pub name: String,
}

/// Collection details.
#[derive(Debug, Deserialize)]
pub struct CollectionDetails {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub parts: Vec<CollectionPart>,
}

/// A movie inside a collection.
#[derive(Debug, Deserialize)]
pub struct CollectionPart {
    pub id: u64,
    pub title: String,
    pub release_date: Option<String>,
}

impl From<MovieDetails> for Movie {
    fn from(details: MovieDetails) -> Self {
        Movie {
            title: details.title,
            year: year_from_date(details.release_date.as_deref()),
            tmdb_id: Some(details.id),
            imdb_id: details.imdb_id.filter(|s| !s.is_empty()),
            collection_id: details.belongs_to_collection.map(|c| c.id),
        }
    }
}

impl From<CollectionDetails> for Collection {
    fn from(details: CollectionDetails) -> Self {
        let collection_id = details.id;
        Collection {
            id: details.id,
            name: details.name,
            parts: details
                .parts
                .into_iter()
                .map(|p| {
                    Movie::new(p.title, year_from_date(p.release_date.as_deref()))
                        .with_tmdb_id(p.id)
                        .with_collection(collection_id)
                })
                .collect(),
        }
    }
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Build a request with proper authentication.
    fn build_request(&self, key: &ApiKey, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        if key.is_bearer() {
            request.header("Authorization", format!("Bearer {}", key.expose()))
        } else {
            request.query(&[("api_key", key.expose())])
        }
    }

    /// Build URL with the language parameter.
    fn build_url(&self, path: &str, extra_params: &str) -> String {
        format!(
            "{}/{}?language={}{}",
            self.config.base_url.trim_end_matches('/'),
            path,
            self.config.language,
            extra_params
        )
    }

    /// Send a GET and decode the JSON body, turning non-2xx into errors.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, key: &ApiKey, url: &str) -> Result<T> {
        let resp = self.build_request(key, url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<StatusBody>()
                .await
                .ok()
                .and_then(|b| b.status_message)
                .unwrap_or_else(|| status.to_string());
            return Err(Error::TmdbRequest(format!("{} ({})", message, status.as_u16())));
        }
        Ok(resp.json().await?)
    }

    /// Search for movies.
    pub async fn search_movie(&self, key: &ApiKey, query: &str, year: Option<u16>) -> Result<Vec<MovieSearchItem>> {
        let year_param = year.map(|y| format!("&year={}", y)).unwrap_or_default();
        let url = self.build_url(
            "search/movie",
            &format!("&query={}{}", urlencoding::encode(query), year_param),
        );
        let resp: MovieSearchResult = self.get_json(key, &url).await?;
        Ok(resp.results)
    }

    /// Find a movie by its IMDB ID.
    pub async fn find_by_imdb(&self, key: &ApiKey, imdb_id: &str) -> Result<Option<u64>> {
        let url = self.build_url(
            &format!("find/{}", urlencoding::encode(imdb_id)),
            "&external_source=imdb_id",
        );
        let resp: FindResult = self.get_json(key, &url).await?;
        Ok(resp.movie_results.first().map(|m| m.id))
    }

    /// Get movie details.
    pub async fn get_movie_details(&self, key: &ApiKey, movie_id: u64) -> Result<MovieDetails> {
        let url = self.build_url(&format!("movie/{}", movie_id), "");
        self.get_json(key, &url).await
    }

    /// TMDB id of the search result whose title and year match the movie.
    async fn search_id(&self, key: &ApiKey, movie: &Movie) -> Result<Option<u64>> {
        let results = self.search_movie(key, &movie.title, movie.year).await?;
        let wanted = movie.key();
        let exact = results.iter().find(|item| {
            Movie::new(item.title.clone(), year_from_date(item.release_date.as_deref())).key() == wanted
        });
        Ok(exact.map(|item| item.id))
    }
}

#[async_trait]
impl MetadataService for TmdbClient {
    async fn test_credential(&self, key: &ApiKey) -> Result<CredentialStatus> {
        let url = format!("{}/authentication", self.config.base_url.trim_end_matches('/'));
        let resp = self
            .build_request(key, &url)
            .send()
            .await
            .map_err(|e| Error::MetadataUnavailable(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(CredentialStatus::Valid);
        }
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::MetadataUnavailable(format!("TMDB returned {}", status)));
        }

        let reason = resp
            .json::<StatusBody>()
            .await
            .ok()
            .and_then(|b| b.status_message)
            .unwrap_or_else(|| format!("TMDB returned {}", status));
        Ok(CredentialStatus::Invalid { reason })
    }

    async fn get_collection(&self, key: &ApiKey, collection_id: u64) -> Result<Collection> {
        let url = self.build_url(&format!("collection/{}", collection_id), "");
        let resp = self.build_request(key, &url).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::CollectionNotFound(collection_id));
        }
        let resp = resp.error_for_status()?;
        let details: CollectionDetails = resp.json().await?;
        Ok(details.into())
    }

    async fn lookup_movie(&self, key: &ApiKey, movie: &Movie) -> Result<Option<Movie>> {
        let tmdb_id = match (movie.tmdb_id, movie.imdb_id.as_deref()) {
            (Some(id), _) => Some(id),
            (None, Some(imdb_id)) => match self.find_by_imdb(key, imdb_id).await? {
                Some(id) => Some(id),
                None => self.search_id(key, movie).await?,
            },
            (None, None) => self.search_id(key, movie).await?,
        };

        let Some(tmdb_id) = tmdb_id else {
            tracing::debug!("No TMDB match for {}", movie);
            return Ok(None);
        };

        let details = self.get_movie_details(key, tmdb_id).await?;
        Ok(Some(details.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Secret;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> TmdbClient {
        TmdbClient::new(TmdbClientConfig {
            base_url: server.uri(),
            ..TmdbClientConfig::default()
        })
        .unwrap()
    }

    fn key(value: &str) -> ApiKey {
        ApiKey::resolve(Some(&Secret::new(value))).unwrap()
    }

    #[tokio::test]
    async fn test_credential_valid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/authentication"))
            .and(query_param("api_key", "good"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
            .mount(&server)
            .await;

        let status = client(&server).test_credential(&key("good")).await.unwrap();
        assert_eq!(status, CredentialStatus::Valid);
    }

    #[tokio::test]
    async fn test_credential_invalid_carries_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/authentication"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "status_code": 7,
                "status_message": "Invalid API key: You must be granted a valid key.",
                "success": false
            })))
            .mount(&server)
            .await;

        let status = client(&server).test_credential(&key("bad")).await.unwrap();
        assert_eq!(
            status,
            CredentialStatus::Invalid {
                reason: "Invalid API key: You must be granted a valid key.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_credential_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/authentication"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server).test_credential(&key("k")).await.unwrap_err();
        assert!(matches!(err, Error::MetadataUnavailable(_)));
    }

    #[tokio::test]
    async fn test_bearer_token_uses_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/authentication"))
            .and(wiremock::matchers::header("Authorization", "Bearer eyJtoken"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let status = client(&server).test_credential(&key("eyJtoken")).await.unwrap();
        assert_eq!(status, CredentialStatus::Valid);
    }

    #[tokio::test]
    async fn test_get_collection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collection/2344"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 2344,
                "name": "The Matrix Collection",
                "parts": [
                    {"id": 603, "title": "The Matrix", "release_date": "1999-03-30"},
                    {"id": 604, "title": "The Matrix Reloaded", "release_date": "2003-05-15"},
                    {"id": 999, "title": "Untitled Matrix Project", "release_date": ""}
                ]
            })))
            .mount(&server)
            .await;

        let collection = client(&server).get_collection(&key("k"), 2344).await.unwrap();
        assert_eq!(collection.name, "The Matrix Collection");
        assert_eq!(collection.parts.len(), 3);
        assert_eq!(collection.parts[1].year, Some(2003));
        assert_eq!(collection.parts[1].tmdb_id, Some(604));
        assert_eq!(collection.parts[1].collection_id, Some(2344));
        assert_eq!(collection.parts[2].year, None);
    }

    #[tokio::test]
    async fn test_get_collection_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collection/1"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server).get_collection(&key("k"), 1).await.unwrap_err();
        assert!(matches!(err, Error::CollectionNotFound(1)));
    }

    #[tokio::test]
    async fn test_lookup_by_imdb_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/find/tt0133093"))
            .and(query_param("external_source", "imdb_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "movie_results": [{"id": 603, "title": "The Matrix", "release_date": "1999-03-30"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/movie/603"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 603,
                "imdb_id": "tt0133093",
                "title": "The Matrix",
                "release_date": "1999-03-30",
                "belongs_to_collection": {"id": 2344, "name": "The Matrix Collection"}
            })))
            .mount(&server)
            .await;

        let movie = Movie::new("The Matrix", Some(1999)).with_imdb_id("tt0133093");
        let found = client(&server).lookup_movie(&key("k"), &movie).await.unwrap().unwrap();
        assert_eq!(found.tmdb_id, Some(603));
        assert_eq!(found.collection_id, Some(2344));
    }

    #[tokio::test]
    async fn test_lookup_by_search_prefers_exact_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .and(query_param("query", "Alien"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"id": 8077, "title": "Alien³", "release_date": "1992-05-22"},
                    {"id": 348, "title": "Alien", "release_date": "1979-05-25"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/movie/348"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 348,
                "imdb_id": "tt0078748",
                "title": "Alien",
                "release_date": "1979-05-25",
                "belongs_to_collection": {"id": 8091, "name": "Alien Collection"}
            })))
            .mount(&server)
            .await;

        let found = client(&server)
            .lookup_movie(&key("k"), &Movie::new("Alien", Some(1979)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.tmdb_id, Some(348));
        assert_eq!(found.collection_id, Some(8091));
    }

    #[tokio::test]
    async fn test_lookup_without_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
            .mount(&server)
            .await;

        let found = client(&server)
            .lookup_movie(&key("k"), &Movie::new("Home Video", None))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_lookup_ignores_unrelated_search_hit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"id": 603, "title": "The Matrix", "release_date": "1999-03-30"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/movie/603"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 603,
                "title": "The Matrix",
                "release_date": "1999-03-30",
                "belongs_to_collection": {"id": 2344, "name": "The Matrix Collection"}
            })))
            .expect(0)
            .mount(&server)
            .await;

        let found = client(&server)
            .lookup_movie(&key("k"), &Movie::new("Home Video 2014", Some(2014)))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_credential_rate_limited_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/authentication"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "status_code": 25,
                "status_message": "Your request count is over the allowed limit."
            })))
            .mount(&server)
            .await;

        let result = client(&server).test_credential(&key("k")).await;
        assert!(matches!(result, Err(Error::MetadataUnavailable(_))));
    }
}
