use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub const LRCLIB_BASE_URL: &str = "https://lrclib.net/api";

/// One lookup attempt against the lyrics service. Tiers vary the artist
/// string and drop the album; the track name is constant across tiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LyricsRequest {
    pub track: String,
    pub artist: String,
    pub album: Option<String>,
    pub duration: Option<u64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProviderLyrics {
    #[serde(rename = "syncedLyrics")]
    pub synced_lyrics: Option<String>,
    #[serde(rename = "plainLyrics")]
    pub plain_lyrics: Option<String>,
}

impl ProviderLyrics {
    /// Synced text when present and non-empty, plain text otherwise.
    pub fn effective(&self) -> Option<&str> {
        for candidate in [&self.synced_lyrics, &self.plain_lyrics] {
            if let Some(text) = candidate {
                if !text.trim().is_empty() {
                    return Some(text.as_str());
                }
            }
        }
        None
    }
}

#[derive(Debug)]
pub enum ProviderError {
    Request(reqwest::Error),
    Status(u16),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Request(err) => write!(f, "request failed: {}", err),
            ProviderError::Status(code) => write!(f, "unexpected status {}", code),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Request(err)
    }
}

/// Lyrics lookup seam. Production uses [`LrcLibClient`]; tests script
/// responses through this trait.
#[async_trait]
pub trait LyricsSource: Send + Sync {
    async fn lookup(&self, request: &LyricsRequest)
        -> Result<Option<ProviderLyrics>, ProviderError>;
}

/// LRCLIB `GET /get` client. A 404 means the service has no lyrics for
/// the request; any other non-success status is a provider error.
pub struct LrcLibClient {
    client: Client,
    base_url: String,
}

impl LrcLibClient {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, LRCLIB_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl LyricsSource for LrcLibClient {
    async fn lookup(
        &self,
        request: &LyricsRequest,
    ) -> Result<Option<ProviderLyrics>, ProviderError> {
        let url = format!("{}/get", self.base_url);
        let mut query: Vec<(&str, String)> = vec![
            ("track_name", request.track.clone()),
            ("artist_name", request.artist.clone()),
        ];
        if let Some(album) = &request.album {
            query.push(("album_name", album.clone()));
        }
        if let Some(duration) = request.duration {
            query.push(("duration", duration.to_string()));
        }

        let response = self.client.get(&url).query(&query).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }
        let lyrics = response.json::<ProviderLyrics>().await?;
        Ok(Some(lyrics))
    }
}
