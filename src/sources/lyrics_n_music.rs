//! LYRICSnMUSIC API.
//!
//! The JSON search only returns a link to the licensed lyrics page, so a
//! second request fetches that page and reads the `<pre>` inside `#main`.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::seq::IndexedRandom;
use scraper::Selector;
use serde::Deserialize;

use super::{HttpClient, LyricsSource, Query, SourceError, SourceId, html};

const API_KEYS: &[&str] = &[
    "5442d9796271ea7baf837dfb2bfb4c",
    "ccae79268ebd14d14df857b203e029",
    "5f7f6670358b899f4b6c69f61bd80c",
    "1ddd0fc509738936c81f61451bad1b",
    "867d86fe3d85f2dfea8a23a790863d",
    "a096049a914d27dc189f26b6d3777d",
    "881954ca4ae494d6f2030166158405",
    "fbeb6447d7b6e00dad7f1d98c305dc",
];

static MAIN_PRE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#main pre").expect("valid #main pre selector"));

#[derive(Debug, Deserialize)]
struct SongHit {
    url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LyricsNMusic {
    http: HttpClient,
    base_url: String,
    api_key: &'static str,
}

impl LyricsNMusic {
    const DEFAULT_BASE_URL: &'static str = "http://api.lyricsnmusic.com/songs";

    pub fn new(http: HttpClient) -> Self {
        let api_key = API_KEYS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(API_KEYS[0]);
        Self {
            http,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            api_key,
        }
    }

    fn search_url(&self, artist: &str, title: &str) -> String {
        format!(
            "{}?api_key={}&artist={}&track={}",
            self.base_url,
            self.api_key,
            urlencoding::encode(artist),
            urlencoding::encode(title)
        )
    }
}

pub fn parse(page: &str) -> Option<String> {
    html::select_text(page, &MAIN_PRE).map(|s| s.replace('\r', ""))
}

#[async_trait]
impl LyricsSource for LyricsNMusic {
    fn id(&self) -> SourceId {
        SourceId::LyricsNMusic
    }

    async fn fetch(&self, query: &Query) -> Result<String, SourceError> {
        // An unknown song is an empty list with a 200 status.
        let hits: Vec<SongHit> = self.http.get_json(&self.search_url(&query.artist, &query.title)).await?;
        let url = hits
            .into_iter()
            .next()
            .and_then(|h| h.url)
            .ok_or(SourceError::NotFound)?;

        let page = self.http.get_text(&url).await?;
        parse(&page).ok_or(SourceError::NotFound)
    }
}
