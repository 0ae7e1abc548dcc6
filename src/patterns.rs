//! Per-site URL Pattern Set (§4.A). Gates which discovered URLs are
//! harvest-worthy and binds matched URLs to a category/exclusion/ad-script
//! profile.

use regex::Regex;

use crate::error::{CrawlError, CrawlResult};
use crate::model::{CrawlerId, PatternId, PatternProfile, UrlPattern};
use crate::utils::{strip_fragment, strip_www};

struct CompiledPattern {
    pattern: UrlPattern,
    regex: Regex,
}

/// Holds every [`UrlPattern`] for one crawler plus its precompiled,
/// case-insensitive regex. Insertion order is preserved so that
/// `match_url`'s "first non-default match wins" tie-break is well-defined.
pub struct UrlPatternSet {
    crawler_id: CrawlerId,
    patterns: Vec<CompiledPattern>,
}

fn compile(regex_source: &str) -> CrawlResult<Regex> {
    regex::RegexBuilder::new(regex_source)
        .case_insensitive(true)
        .build()
        .map_err(CrawlError::InvalidPatternRegex)
}

impl UrlPatternSet {
    pub fn new(crawler_id: CrawlerId) -> Self {
        Self {
            crawler_id,
            patterns: Vec::new(),
        }
    }

    pub fn crawler_id(&self) -> CrawlerId {
        self.crawler_id
    }

    /// Upsert a pattern. If the owning crawler has no default yet, or the
    /// save explicitly requests default, this pattern is promoted to
    /// default (§4.A `save`).
    pub fn save(&mut self, mut pattern: UrlPattern, make_default: bool) -> CrawlResult<PatternId> {
        let regex = compile(&pattern.regex_source)?;
        let has_default = self.patterns.iter().any(|p| p.pattern.is_default);
        if make_default || !has_default {
            for p in &mut self.patterns {
                p.pattern.is_default = false;
            }
            pattern.is_default = true;
        }
        let id = pattern.id;
        if let Some(existing) = self.patterns.iter_mut().find(|p| p.pattern.id == id) {
            existing.pattern = pattern;
            existing.regex = regex;
        } else {
            self.patterns.push(CompiledPattern { pattern, regex });
        }
        Ok(id)
    }

    fn is_image(url: &str) -> bool {
        let lower = url.to_lowercase();
        lower.ends_with(".jpg") || lower.ends_with(".png")
    }

    /// True iff the URL is not an image and, after fragment-stripping,
    /// matches at least one pattern's regex (§4.A `validate`).
    pub fn validate(&self, url: &str) -> bool {
        if Self::is_image(url) {
            return false;
        }
        let stripped = strip_fragment(url);
        self.patterns.iter().any(|p| p.regex.is_match(stripped))
    }

    /// Strip fragment, evaluate all regexes; non-default matches win over
    /// the default, tie-broken by insertion order (§4.A `match`).
    pub fn match_url(&self, url: &str) -> Option<PatternProfile> {
        let stripped = strip_fragment(url);
        let mut default_profile = None;
        for cp in &self.patterns {
            if !cp.regex.is_match(stripped) {
                continue;
            }
            if cp.pattern.is_default {
                if default_profile.is_none() {
                    default_profile = Some(PatternProfile::from(&cp.pattern));
                }
            } else {
                return Some(PatternProfile::from(&cp.pattern));
            }
        }
        default_profile
    }

    pub fn patterns(&self) -> impl Iterator<Item = &UrlPattern> {
        self.patterns.iter().map(|p| &p.pattern)
    }
}

/// Host-agnostic lookup across every site's pattern sets, retrying with and
/// without the `www.` prefix (§4.A `arbitrary-match`). As the source notes,
/// without host scoping this may match a pattern from an unrelated crawler
/// (§9 Open Questions) — preserved here rather than "fixed".
pub fn arbitrary_match(sets: &[&UrlPatternSet], url: &str) -> Option<PatternProfile> {
    let host = crate::utils::hostname_of(url)?;
    let host = strip_www(&host);
    for set in sets {
        let matches_host = set
            .patterns
            .iter()
            .any(|p| strip_www(&p.pattern.hostname) == host);
        if !matches_host {
            continue;
        }
        if let Some(profile) = set.match_url(url) {
            return Some(profile);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(crawler_id: CrawlerId, regex: &str, is_default: bool) -> UrlPattern {
        UrlPattern {
            id: PatternId::new(),
            crawler_id,
            hostname: "a.test".to_string(),
            regex_source: regex.to_string(),
            harvester_categories: vec!["news".to_string()],
            exclude_words: vec![],
            ad_script: String::new(),
            is_default,
        }
    }

    #[test]
    fn non_default_wins_over_default() {
        let crawler_id = CrawlerId::new();
        let mut set = UrlPatternSet::new(crawler_id);
        set.save(pattern(crawler_id, r"^http://a\.test/.*$", true), true)
            .unwrap();
        set.save(pattern(crawler_id, r"^http://a\.test/blog/.*$", false), false)
            .unwrap();

        let blog = set.match_url("http://a.test/blog/1").unwrap();
        assert!(!blog.is_default);
        let about = set.match_url("http://a.test/about").unwrap();
        assert!(about.is_default);
    }

    #[test]
    fn fragment_is_ignored() {
        let crawler_id = CrawlerId::new();
        let mut set = UrlPatternSet::new(crawler_id);
        set.save(pattern(crawler_id, r"^http://a\.test/articles/.*$", false), true)
            .unwrap();
        assert!(set.validate("http://a.test/articles/1#section"));
        assert_eq!(
            set.match_url("http://a.test/articles/1#a").unwrap().pattern_id,
            set.match_url("http://a.test/articles/1#b").unwrap().pattern_id
        );
    }

    #[test]
    fn image_urls_never_validate() {
        let crawler_id = CrawlerId::new();
        let mut set = UrlPatternSet::new(crawler_id);
        set.save(pattern(crawler_id, r"^http://a\.test/.*$", false), true)
            .unwrap();
        assert!(!set.validate("http://a.test/photo.jpg"));
        assert!(!set.validate("http://a.test/photo.PNG"));
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let crawler_id = CrawlerId::new();
        let mut set = UrlPatternSet::new(crawler_id);
        let err = set.save(pattern(crawler_id, r"(unclosed", false), false);
        assert!(matches!(err, Err(CrawlError::InvalidPatternRegex(_))));
    }

    #[test]
    fn match_is_deterministic() {
        let crawler_id = CrawlerId::new();
        let mut set = UrlPatternSet::new(crawler_id);
        set.save(pattern(crawler_id, r"^http://a\.test/.*$", true), true)
            .unwrap();
        let first = set.match_url("http://a.test/x").map(|p| p.pattern_id);
        let second = set.match_url("http://a.test/x").map(|p| p.pattern_id);
        assert_eq!(first, second);
    }
}
