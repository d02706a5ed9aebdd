//! Plex Media Server client.
//!
//! Talks JSON (`Accept: application/json`) and sends the token in the
//! `X-Plex-Token` header so it never shows up in a logged URL.

use crate::error::MediaServerError;
use crate::models::{Library, LibraryKind, Movie, Server};
use crate::services::{MediaServerClient, ProbeResult};
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

type PlexResult<T> = std::result::Result<T, MediaServerError>;

/// Envelope every Plex JSON response is wrapped in.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "MediaContainer")]
    media_container: T,
}

/// Server identity returned by `GET /`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerIdentity {
    pub machine_identifier: String,
    pub friendly_name: Option<String>,
}

/// Library sections container.
#[derive(Debug, Default, Deserialize)]
struct SectionsContainer {
    #[serde(rename = "Directory", default)]
    directories: Vec<Section>,
}

/// A library section.
#[derive(Debug, Deserialize)]
pub struct Section {
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Library contents container.
#[derive(Debug, Default, Deserialize)]
struct MetadataContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<MetadataItem>,
}

/// One item of a library listing.
#[derive(Debug, Deserialize)]
pub struct MetadataItem {
    pub title: String,
    pub year: Option<u16>,
    /// Primary agent GUID (legacy agents embed the TMDB/IMDB id here).
    pub guid: Option<String>,
    /// External GUIDs of the new Plex agent (`includeGuids=1`).
    #[serde(rename = "Guid", default)]
    pub guids: Vec<Guid>,
}

/// External GUID entry.
#[derive(Debug, Deserialize)]
pub struct Guid {
    pub id: String,
}

impl From<MetadataItem> for Movie {
    fn from(item: MetadataItem) -> Self {
        let all_guids: Vec<&str> = item
            .guid
            .iter()
            .map(String::as_str)
            .chain(item.guids.iter().map(|g| g.id.as_str()))
            .collect();

        let mut movie = Movie::new(item.title.trim(), item.year);
        movie.tmdb_id = all_guids.iter().find_map(|g| parse_tmdb_guid(g));
        movie.imdb_id = all_guids.iter().find_map(|g| parse_imdb_guid(g));
        movie
    }
}

/// Extract a TMDB id from `tmdb://603` or `com.plexapp.agents.themoviedb://603?lang=en`.
pub fn parse_tmdb_guid(guid: &str) -> Option<u64> {
    let re = regex::Regex::new(r"(?:tmdb|themoviedb)://(\d+)").ok()?;
    re.captures(guid)?.get(1)?.as_str().parse().ok()
}

/// Extract an IMDB id from `imdb://tt0133093` or `com.plexapp.agents.imdb://tt0133093?lang=en`.
pub fn parse_imdb_guid(guid: &str) -> Option<String> {
    let re = regex::Regex::new(r"imdb://(tt\d{7,})").ok()?;
    Some(re.captures(guid)?.get(1)?.as_str().to_string())
}

/// Plex HTTP client.
#[derive(Debug, Clone)]
pub struct PlexClient {
    client: reqwest::Client,
}

impl PlexClient {
    /// Create a client whose requests give up after `timeout`.
    pub fn new(timeout: std::time::Duration) -> crate::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// GET `url` on `server` and decode the `MediaContainer`.
    async fn get_container<T: serde::de::DeserializeOwned>(&self, server: &Server, url: Url) -> PlexResult<T> {
        tracing::debug!("GET {}", url);
        let resp = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("X-Plex-Token", server.token.expose())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = match body.trim() {
                "" => status.canonical_reason().unwrap_or("request failed").to_string(),
                text => text.chars().take(200).collect(),
            };
            return Err(MediaServerError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = resp
            .json()
            .await
            .map_err(|e| MediaServerError::Decode(e.to_string()))?;
        Ok(envelope.media_container)
    }

    /// Identity of the server at the configured address.
    pub async fn identity(&self, server: &Server) -> PlexResult<ServerIdentity> {
        let url = server.base_url()?;
        self.get_container(server, url).await
    }
}

#[async_trait]
impl MediaServerClient for PlexClient {
    async fn probe(&self, server: &Server) -> ProbeResult {
        match self.identity(server).await {
            Ok(identity) if identity.machine_identifier == server.id => ProbeResult::Ok,
            Ok(identity) => ProbeResult::failed(format!(
                "machine identifier mismatch: expected {}, found {}",
                server.id, identity.machine_identifier
            )),
            Err(MediaServerError::Http { status: 401, .. }) => {
                ProbeResult::failed("unauthorized, check the Plex token")
            }
            Err(e) => ProbeResult::failed(e.to_string()),
        }
    }

    async fn list_libraries(&self, server: &Server) -> PlexResult<Vec<Library>> {
        let url = server
            .base_url()?
            .join("library/sections")
            .map_err(|e| MediaServerError::Address(e.to_string()))?;
        let container: SectionsContainer = self.get_container(server, url).await?;

        Ok(container
            .directories
            .into_iter()
            .map(|s| Library::new(&server.id, &s.key, &s.title, LibraryKind::from_plex(&s.kind)))
            .collect())
    }

    async fn list_movies(&self, server: &Server, library_url: &Url) -> PlexResult<Vec<Movie>> {
        let mut url = library_url.clone();
        url.query_pairs_mut().append_pair("includeGuids", "1");
        let container: MetadataContainer = self.get_container(server, url).await?;

        Ok(container.metadata.into_iter().map(Movie::from).collect())
    }
}
