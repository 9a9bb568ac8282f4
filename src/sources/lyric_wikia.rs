//! LyricWiki pages: `<base>/wiki/Artist_Name:Song_Title`, lyrics in `.lyricbox`.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::Selector;

use super::{HttpClient, LyricsSource, Query, SourceError, SourceId, html};

static LYRICBOX: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".lyricbox").expect("valid lyricbox selector"));

#[derive(Debug, Clone)]
pub struct LyricWikia {
    http: HttpClient,
    base_url: String,
}

impl LyricWikia {
    const DEFAULT_BASE_URL: &'static str = "http://lyrics.wikia.com";

    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    fn url(&self, query: &Query) -> String {
        format!("{}/wiki/{}", self.base_url, query.lookup_key)
    }
}

pub fn parse(page: &str) -> Option<String> {
    html::select_text(page, &LYRICBOX)
}

#[async_trait]
impl LyricsSource for LyricWikia {
    fn id(&self) -> SourceId {
        SourceId::LyricWikia
    }

    async fn fetch(&self, query: &Query) -> Result<String, SourceError> {
        let page = self.http.get_text(&self.url(query)).await?;
        parse(&page).ok_or(SourceError::NotFound)
    }
}
