//! musiXmatch pages: `<base>/lyrics/Artist-Name/Song-Title`. The lyrics are
//! split across several content blocks.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::Selector;

use super::http::word_slug;
use super::{HttpClient, LyricsSource, Query, SourceError, SourceId, html};

static CONTENT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p.mxm-lyrics__content, span.lyrics__content__ok")
        .expect("valid musixmatch selector")
});

#[derive(Debug, Clone)]
pub struct MusixMatch {
    http: HttpClient,
    base_url: String,
}

impl MusixMatch {
    const DEFAULT_BASE_URL: &'static str = "https://www.musixmatch.com";

    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    fn url(&self, artist: &str, title: &str) -> Option<String> {
        let artist = word_slug(artist, '-');
        let title = word_slug(title, '-');
        if artist.is_empty() || title.is_empty() {
            return None;
        }
        Some(format!("{}/lyrics/{artist}/{title}", self.base_url))
    }
}

pub fn parse(page: &str) -> Option<String> {
    html::select_all_text(page, &CONTENT)
}

#[async_trait]
impl LyricsSource for MusixMatch {
    fn id(&self) -> SourceId {
        SourceId::MusixMatch
    }

    async fn fetch(&self, query: &Query) -> Result<String, SourceError> {
        let url = self.url(&query.artist, &query.title).ok_or(SourceError::NotFound)?;
        let page = self.http.get_text(&url).await?;
        parse(&page).ok_or(SourceError::NotFound)
    }
}
