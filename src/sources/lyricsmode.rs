//! LYRICSMODE pages: `<base>/lyrics/<first letter>/<artist>/<title>.html`.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::Selector;

use super::http::word_slug;
use super::{HttpClient, LyricsSource, Query, SourceError, SourceId, html};

static LYRICS_TEXT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#lyrics_text").expect("valid #lyrics_text selector"));

#[derive(Debug, Clone)]
pub struct LyricsMode {
    http: HttpClient,
    base_url: String,
}

impl LyricsMode {
    const DEFAULT_BASE_URL: &'static str = "https://www.lyricsmode.com";

    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    fn url(&self, artist: &str, title: &str) -> Option<String> {
        let artist = word_slug(artist, '_').to_ascii_lowercase();
        let title = word_slug(title, '_').to_ascii_lowercase();
        let first = artist.chars().next()?;
        if title.is_empty() {
            return None;
        }
        // Artists starting with a digit are filed under "0-9".
        let shelf = if first.is_ascii_digit() {
            "0-9".to_string()
        } else {
            first.to_string()
        };
        Some(format!("{}/lyrics/{shelf}/{artist}/{title}.html", self.base_url))
    }
}

pub fn parse(page: &str) -> Option<String> {
    html::select_text(page, &LYRICS_TEXT)
}

#[async_trait]
impl LyricsSource for LyricsMode {
    fn id(&self) -> SourceId {
        SourceId::LyricsMode
    }

    async fn fetch(&self, query: &Query) -> Result<String, SourceError> {
        let url = self.url(&query.artist, &query.title).ok_or(SourceError::NotFound)?;
        let page = self.http.get_text(&url).await?;
        parse(&page).ok_or(SourceError::NotFound)
    }
}
