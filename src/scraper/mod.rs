//! Content scraping pipeline (§4.C). Three concrete variants share a base
//! contract; each normalizes arbitrary HTML into a [`PageRecord`].

mod newspaper;
mod readability;
mod soup;

pub use newspaper::NewspaperScraper;
pub use readability::ReadabilityScraper;
pub use soup::SoupScraper;

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Datelike, Months, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use crate::error::{CrawlError, CrawlResult};
use crate::model::{PageRecord, ScraperKind};
use crate::utils::constants::FEED_CONTENT_TYPES;
use crate::utils::strip_fragment;

/// Per-variant body extraction: title, grouped text pieces, and inline
/// highlights. Shared fetch/date/link logic lives in this module; only
/// this step differs between Soup/Newspaper/Readability (§9 design notes:
/// "tagged variant implementing the capability set").
pub(crate) trait BodyExtractor: Send + Sync {
    fn extract_body(&self, html: &Html, url: &str) -> ExtractedBody;
}

pub(crate) struct ExtractedBody {
    pub title: String,
    pub text: Vec<String>,
    pub highlighted_strings: Vec<String>,
}

/// A capability-set scraper: `fetch`, `scrape`, `scrape_rss`, `get_text`,
/// `get_links`, `get_meta`, `get_date` (§9). `scrape`/`scrape_rss` are the
/// only entry points a crawler calls; the rest are exposed for tests and
/// for direct use by the admin `extract_url` operation.
pub struct Scraper {
    kind: ScraperKind,
    client: reqwest::Client,
    body_extractor: Box<dyn BodyExtractor>,
}

impl Scraper {
    pub fn new(kind: ScraperKind, user_agent: &str, timeout: Duration) -> CrawlResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| CrawlError::Fetch {
                url: String::new(),
                source: e,
            })?;
        let body_extractor: Box<dyn BodyExtractor> = match kind {
            ScraperKind::Soup => Box::new(SoupScraper),
            ScraperKind::Newspaper => Box::new(NewspaperScraper),
            ScraperKind::Readability => Box::new(ReadabilityScraper),
        };
        Ok(Self {
            kind,
            client,
            body_extractor,
        })
    }

    pub fn kind(&self) -> ScraperKind {
        self.kind
    }

    /// `is-html(url)` (§4.C): path-sniff first, else HEAD and check
    /// content-type.
    pub async fn is_html(&self, url: &str) -> bool {
        if url.contains(".html") || url.contains(".htm") {
            return true;
        }
        match self.client.head(url).send().await {
            Ok(resp) => resp
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|ct| ct.split(';').next().unwrap_or("").trim() == "text/html")
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// `is-rss` acceptance set check (§4.C).
    pub async fn is_rss(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(resp) => resp
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|ct| {
                    let base = ct.split(';').next().unwrap_or("").trim();
                    FEED_CONTENT_TYPES.contains(&base)
                })
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Fetch a raw body (e.g. an RSS/Atom feed) with the scraper's shared
    /// client, bypassing HTML parsing. Exposed for the RSS crawler kind
    /// (§4.G), which needs the feed bytes rather than a `PageRecord`.
    pub async fn fetch_raw(&self, url: &str) -> CrawlResult<String> {
        self.fetch(url).await
    }

    /// Fetch HTML with a bounded timeout; `FetchError` on transport
    /// failure (§4.C common base behavior). No retry at this layer (§5).
    async fn fetch(&self, url: &str) -> CrawlResult<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CrawlError::Fetch {
                url: url.to_string(),
                source: e,
            })?;
        resp.text().await.map_err(|e| CrawlError::Fetch {
            url: url.to_string(),
            source: e,
        })
    }

    /// `scrape(url) -> PageRecord` (§4.C).
    pub async fn scrape(&self, url: &str) -> CrawlResult<PageRecord> {
        let html = self.fetch(url).await?;
        let document = Html::parse_document(&html);
        let body = self.body_extractor.extract_body(&document, url);
        let links = extract_links(&document, &html, url);
        let date = extract_date(&document, &html);
        let metadata = extract_metadata(&document);

        Ok(PageRecord {
            url: url.to_string(),
            parser: scraper_name(self.kind).to_string(),
            html,
            publication_date: date,
            metadata,
            links,
            text: body.text,
            title: body.title,
            highlighted_strings: body.highlighted_strings,
        })
    }

    /// `scrape-rss(url) -> PageRecord-without-links` (§4.C). Links are
    /// left empty; the RSS crawler seeds the frontier from feed entries
    /// directly, not from in-page link extraction.
    pub async fn scrape_rss(&self, url: &str) -> CrawlResult<PageRecord> {
        let html = self.fetch(url).await?;
        let document = Html::parse_document(&html);
        let body = self.body_extractor.extract_body(&document, url);
        let date = extract_date(&document, &html);
        let metadata = extract_metadata(&document);

        Ok(PageRecord {
            url: url.to_string(),
            parser: scraper_name(self.kind).to_string(),
            html,
            publication_date: date,
            metadata,
            links: Vec::new(),
            text: body.text,
            title: body.title,
            highlighted_strings: body.highlighted_strings,
        })
    }
}

fn scraper_name(kind: ScraperKind) -> &'static str {
    match kind {
        ScraperKind::Soup => "soup_scraper",
        ScraperKind::Newspaper => "newspaper_scraper",
        ScraperKind::Readability => "readability_scraper",
    }
}

/// Whitespace-normalize scraped text (§4.C common base behavior).
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

static URL_SCAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s"'<>]+"#).unwrap());

/// Union of (a) absolute URLs matched by a URL regex scan of the raw HTML
/// and (b) `<a href>` values resolved against the page URL, deduped after
/// fragment-strip (§4.C "Link extraction").
fn extract_links(document: &Html, raw_html: &str, page_url: &str) -> Vec<String> {
    let base = url::Url::parse(page_url).ok();
    let mut seen = indexmap::IndexSet::new();

    for m in URL_SCAN_RE.find_iter(raw_html) {
        seen.insert(strip_fragment(m.as_str()).to_string());
    }

    if let Ok(selector) = Selector::parse("a") {
        for el in document.select(&selector) {
            if let Some(href) = el.value().attr("href") {
                let resolved = match &base {
                    Some(base) => base.join(href).ok().map(|u| u.to_string()),
                    None => Some(href.to_string()),
                };
                if let Some(resolved) = resolved {
                    seen.insert(strip_fragment(&resolved).to_string());
                }
            }
        }
    }

    seen.into_iter().collect()
}

static MONTH_NAME_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?|Aug(?:ust)?|Sep(?:t|tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b",
    )
    .unwrap()
});

static NTH_OF_MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\s+of\s+(Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?|Aug(?:ust)?|Sep(?:t|tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?),?\s+(\d{4})\b",
    )
    .unwrap()
});

static NUMERIC_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap());

/// Weekday-based form with no month name ("Monday the 23rd", "Wed 23rd") —
/// month/year are inferred the same way `dateutil.parse` infers them for
/// this pattern, by scanning backward for the nearest month whose given day
/// actually falls on the named weekday.
static WEEKDAY_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(Mon(?:day)?|Tue(?:s|sday)?|Wed(?:nesday)?|Thu(?:rs|rsday)?|Fri(?:day)?|Sat(?:urday)?|Sun(?:day)?)\b,?\s+(?:the\s+)?(\d{1,2})(?:st|nd|rd|th)\b",
    )
    .unwrap()
});

fn month_index(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    const MONTHS: &[&str] = &[
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    MONTHS
        .iter()
        .position(|m| lower.starts_with(m))
        .map(|i| i as u32 + 1)
}

fn weekday_index(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    const WEEKDAYS: &[&str] = &["mon", "tue", "wed", "thu", "fri", "sat", "sun"];
    WEEKDAYS
        .iter()
        .position(|w| lower.starts_with(w))
        .map(|i| i as u32)
}

/// Find the most recent month (scanning back up to two years from `now`)
/// whose `day` falls on the given `weekday` (0=Monday..6=Sunday).
fn resolve_weekday_date(weekday: u32, day: u32, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let mut cursor = now.date_naive().with_day(1)?;
    for _ in 0..24 {
        if let Some(date) = cursor.with_day(day) {
            if date.weekday().num_days_from_monday() == weekday {
                return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
            }
        }
        cursor = cursor.checked_sub_months(Months::new(1))?;
    }
    None
}

/// Best-effort publication date (§4.C): prefer `<time>` tags, fall back to
/// regex heuristics over raw HTML. Returns the latest date not in the
/// future, or none.
fn extract_date(document: &Html, raw_html: &str) -> Option<DateTime<Utc>> {
    let now = Utc::now();
    let mut candidates: Vec<DateTime<Utc>> = Vec::new();

    if let Ok(selector) = Selector::parse("time") {
        for el in document.select(&selector) {
            let raw = el
                .value()
                .attr("datetime")
                .map(str::to_string)
                .or_else(|| Some(el.text().collect::<String>()));
            if let Some(raw) = raw {
                if let Some(dt) = parse_flexible_datetime(raw.trim()) {
                    candidates.push(dt);
                }
            }
        }
    }

    if candidates.iter().all(|d| *d >= now) {
        for caps in MONTH_NAME_DATE_RE.captures_iter(raw_html) {
            if let (Some(month), day, year) = (
                month_index(&caps[1]),
                caps[2].parse::<u32>().ok(),
                caps[3].parse::<i32>().ok(),
            ) {
                if let (Some(day), Some(year)) = (day, year) {
                    if let Some(dt) = Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single() {
                        candidates.push(dt);
                    }
                }
            }
        }
        for caps in NTH_OF_MONTH_RE.captures_iter(raw_html) {
            if let (day, Some(month), year) = (
                caps[1].parse::<u32>().ok(),
                month_index(&caps[2]),
                caps[3].parse::<i32>().ok(),
            ) {
                if let (Some(day), Some(year)) = (day, year) {
                    if let Some(dt) = Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single() {
                        candidates.push(dt);
                    }
                }
            }
        }
        for caps in NUMERIC_DATE_RE.captures_iter(raw_html) {
            if let (Some(month), Some(day), Some(year)) = (
                caps[1].parse::<u32>().ok(),
                caps[2].parse::<u32>().ok(),
                caps[3].parse::<i32>().ok(),
            ) {
                if let Some(dt) = Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single() {
                    candidates.push(dt);
                }
            }
        }
        for caps in WEEKDAY_DATE_RE.captures_iter(raw_html) {
            if let (Some(weekday), Some(day)) =
                (weekday_index(&caps[1]), caps[2].parse::<u32>().ok())
            {
                if let Some(dt) = resolve_weekday_date(weekday, day, now) {
                    candidates.push(dt);
                }
            }
        }
    }

    candidates.into_iter().filter(|d| *d <= now).max()
}

fn parse_flexible_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

fn extract_metadata(document: &Html) -> BTreeMap<String, serde_json::Value> {
    let mut metadata = BTreeMap::new();
    if let Ok(selector) = Selector::parse(r#"meta[name="keywords"]"#) {
        if let Some(el) = document.select(&selector).next() {
            if let Some(content) = el.value().attr("content") {
                let keywords: Vec<serde_json::Value> = content
                    .split(',')
                    .map(|k| serde_json::Value::String(k.trim().to_string()))
                    .collect();
                metadata.insert("keywords".to_string(), serde_json::Value::Array(keywords));
            }
        }
    }
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_name_date_is_extracted() {
        let html = Html::parse_document("<html><body>Published March 3rd, 2020</body></html>");
        let date = extract_date(&html, "<html><body>Published March 3rd, 2020</body></html>");
        assert!(date.is_some());
        let date = date.unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2020-03-03");
    }

    #[test]
    fn future_dates_are_excluded() {
        let raw = "Published January 1st, 2999";
        let html = Html::parse_document(raw);
        assert!(extract_date(&html, raw).is_none());
    }

    #[test]
    fn weekday_based_date_is_extracted() {
        let yesterday = (Utc::now() - chrono::Duration::days(1)).date_naive();
        let weekday_name = match yesterday.weekday() {
            chrono::Weekday::Mon => "Monday",
            chrono::Weekday::Tue => "Tuesday",
            chrono::Weekday::Wed => "Wednesday",
            chrono::Weekday::Thu => "Thursday",
            chrono::Weekday::Fri => "Friday",
            chrono::Weekday::Sat => "Saturday",
            chrono::Weekday::Sun => "Sunday",
        };
        let raw = format!("Published {} the {}th", weekday_name, yesterday.day());
        let html = Html::parse_document(&raw);
        let date = extract_date(&html, &raw);
        assert!(date.is_some());
        assert_eq!(date.unwrap().date_naive(), yesterday);
    }
}
