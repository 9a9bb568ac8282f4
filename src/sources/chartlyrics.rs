//! ChartLyrics XML API (`apiv1.asmx`).
//!
//! `SearchLyric` returns candidate songs; the first one whose artist and title
//! match and that has a real lyric id is then fetched with `GetLyric`.
//! `SearchLyricDirect` is not used because its first hit is often wrong.

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;

use super::{HttpClient, LyricsSource, Query, SourceError, SourceId};

type Record = HashMap<String, String>;

#[derive(Debug, Clone)]
pub struct ChartLyrics {
    http: HttpClient,
    base_url: String,
}

impl ChartLyrics {
    const DEFAULT_BASE_URL: &'static str = "http://api.chartlyrics.com/apiv1.asmx";

    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    fn search_url(&self, artist: &str, title: &str) -> String {
        format!(
            "{}/SearchLyric?artist={}&song={}",
            self.base_url,
            urlencoding::encode(artist),
            urlencoding::encode(title)
        )
    }

    fn lyric_url(&self, id: &str, checksum: &str) -> String {
        format!(
            "{}/GetLyric?lyricId={}&lyricCheckSum={}",
            self.base_url,
            urlencoding::encode(id),
            urlencoding::encode(checksum)
        )
    }
}

/// Children text of every `<record>` element, keyed by local name.
/// Returns `None` on malformed XML.
fn records(xml: &str, record: &str) -> Option<Vec<Record>> {
    let mut reader = Reader::from_str(xml);
    let mut out = Vec::new();
    let mut current: Option<Record> = None;
    let mut field: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if name == record {
                    current = Some(Record::new());
                } else if current.is_some() {
                    field = Some(name);
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(rec), Some(key)) = (current.as_mut(), field.as_ref()) {
                    let text = t.unescape().ok()?;
                    rec.entry(key.clone()).or_default().push_str(&text);
                }
            }
            Ok(Event::CData(t)) => {
                if let (Some(rec), Some(key)) = (current.as_mut(), field.as_ref()) {
                    let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                    rec.entry(key.clone()).or_default().push_str(&text);
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == record.as_bytes() {
                    out.extend(current.take());
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(error = %err, "malformed chartlyrics xml");
                return None;
            }
        }
    }
    Some(out)
}

fn same(a: Option<&String>, b: &str) -> bool {
    a.is_some_and(|a| a.trim().eq_ignore_ascii_case(b.trim()))
}

fn has_lyric_id(rec: &Record, key: &str) -> bool {
    rec.get(key)
        .and_then(|id| id.trim().parse::<i64>().ok())
        .is_some_and(|id| id > 0)
}

/// `(LyricId, LyricChecksum)` of the first search hit matching the song.
pub fn find_match(xml: &str, artist: &str, title: &str) -> Option<(String, String)> {
    records(xml, "SearchLyricResult")?
        .into_iter()
        .find(|rec| {
            same(rec.get("Artist"), artist)
                && same(rec.get("Song"), title)
                && has_lyric_id(rec, "LyricId")
        })
        .and_then(|rec| {
            let id = rec.get("LyricId")?.trim().to_string();
            let checksum = rec.get("LyricChecksum")?.trim().to_string();
            Some((id, checksum))
        })
}

/// Lyrics from a `GetLyric` response, checked against the requested song.
pub fn parse_lyric(xml: &str, artist: &str, title: &str) -> Option<String> {
    records(xml, "GetLyricResult")?
        .into_iter()
        .find(|rec| {
            same(rec.get("LyricArtist"), artist)
                && same(rec.get("LyricSong"), title)
                && has_lyric_id(rec, "LyricId")
        })
        .and_then(|mut rec| rec.remove("Lyric"))
}

#[async_trait]
impl LyricsSource for ChartLyrics {
    fn id(&self) -> SourceId {
        SourceId::ChartLyrics
    }

    async fn fetch(&self, query: &Query) -> Result<String, SourceError> {
        let (artist, title) = (query.artist.as_str(), query.title.as_str());
        let search = self.http.get_text(&self.search_url(artist, title)).await?;
        let (id, checksum) = find_match(&search, artist, title).ok_or(SourceError::NotFound)?;

        let lyric = self.http.get_text(&self.lyric_url(&id, &checksum)).await?;
        parse_lyric(&lyric, artist, title).ok_or(SourceError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ArrayOfSearchLyricResult xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns="http://api.chartlyrics.com/">
  <SearchLyricResult>
    <TrackId>0</TrackId>
    <LyricChecksum>aaa</LyricChecksum>
    <LyricId>0</LyricId>
    <Artist>Queen</Artist>
    <Song>Bohemian Rhapsody</Song>
  </SearchLyricResult>
  <SearchLyricResult>
    <TrackId>0</TrackId>
    <LyricChecksum>4b2a8c</LyricChecksum>
    <LyricId>1234</LyricId>
    <Artist>Queen</Artist>
    <Song>Bohemian Rhapsody</Song>
  </SearchLyricResult>
  <SearchLyricResult xsi:nil="true" />
</ArrayOfSearchLyricResult>"#;

    const LYRIC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<GetLyricResult xmlns="http://api.chartlyrics.com/">
  <TrackId>0</TrackId>
  <LyricChecksum>4b2a8c</LyricChecksum>
  <LyricId>1234</LyricId>
  <LyricSong>Bohemian Rhapsody</LyricSong>
  <LyricArtist>Queen</LyricArtist>
  <Lyric>Is this the real life?
Is this just fantasy? Rock &amp; roll</Lyric>
</GetLyricResult>"#;

    #[test]
    fn test_find_match_skips_zero_ids() {
        assert_eq!(
            find_match(SEARCH, "queen", "Bohemian Rhapsody"),
            Some(("1234".to_string(), "4b2a8c".to_string()))
        );
        assert_eq!(find_match(SEARCH, "Queen", "Radio Ga Ga"), None);
    }

    #[test]
    fn test_parse_lyric() {
        assert_eq!(
            parse_lyric(LYRIC, "Queen", "Bohemian Rhapsody").as_deref(),
            Some("Is this the real life?\nIs this just fantasy? Rock & roll")
        );
        assert!(parse_lyric(LYRIC, "Queen", "Under Pressure").is_none());
    }

    #[test]
    fn test_malformed_xml() {
        assert!(find_match("<ArrayOfSearchLyricResult><SearchLyricResult>", "A", "B").is_none());
    }

    #[test]
    fn test_urls() {
        let src = ChartLyrics::new(HttpClient::new().unwrap());
        assert_eq!(
            src.search_url("Simon & Garfunkel", "The Boxer"),
            "http://api.chartlyrics.com/apiv1.asmx/SearchLyric?artist=Simon%20%26%20Garfunkel&song=The%20Boxer"
        );
        assert_eq!(
            src.lyric_url("1234", "4b2a8c"),
            "http://api.chartlyrics.com/apiv1.asmx/GetLyric?lyricId=1234&lyricCheckSum=4b2a8c"
        );
    }
}
