//! AZLyrics pages: `<base>/lyrics/<artist>/<title>.html`. The lyrics sit in
//! the only class-less `<div>` of the main text column.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::http::alnum_slug;
use super::{HttpClient, LyricsSource, Query, SourceError, SourceId, html};

static COLUMN_DIVS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.text-center > div").expect("valid azlyrics selector"));

#[derive(Debug, Clone)]
pub struct AzLyrics {
    http: HttpClient,
    base_url: String,
}

impl AzLyrics {
    const DEFAULT_BASE_URL: &'static str = "https://www.azlyrics.com";

    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    fn url(&self, artist: &str, title: &str) -> Option<String> {
        let artist = artist.trim();
        // "The Beatles" lives under "beatles".
        let artist = match (artist.get(..4), artist.get(4..)) {
            (Some(prefix), Some(rest)) if prefix.eq_ignore_ascii_case("the ") => rest,
            _ => artist,
        };
        let artist = alnum_slug(artist);
        let title = alnum_slug(title);
        if artist.is_empty() || title.is_empty() {
            return None;
        }
        Some(format!("{}/lyrics/{artist}/{title}.html", self.base_url))
    }
}

pub fn parse(page: &str) -> Option<String> {
    let doc = Html::parse_document(page);
    doc.select(&COLUMN_DIVS)
        .find(|el| el.value().attr("class").is_none() && el.value().attr("id").is_none())
        .map(html::element_text)
        .filter(|text| !text.trim().is_empty())
}

#[async_trait]
impl LyricsSource for AzLyrics {
    fn id(&self) -> SourceId {
        SourceId::AzLyrics
    }

    async fn fetch(&self, query: &Query) -> Result<String, SourceError> {
        let url = self.url(&query.artist, &query.title).ok_or(SourceError::NotFound)?;
        let page = self.http.get_text(&url).await?;
        parse(&page).ok_or(SourceError::NotFound)
    }
}
