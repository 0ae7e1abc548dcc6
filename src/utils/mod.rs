pub mod constants;

/// Strip the `#...` fragment from a URL, used by the pattern matcher and
/// the frontier's dedup key (§4.A, §4.C).
pub fn strip_fragment(url: &str) -> &str {
    match url.find('#') {
        Some(idx) => &url[..idx],
        None => url,
    }
}

/// Case-fold a name for dictionary lookup (§4.D).
pub fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

/// Extract the hostname from a URL, defaulting to the whole string if it
/// does not parse (defensive only at this literal boundary: URLs stored in
/// the model are expected to be well-formed, but this helper is also used
/// on attacker/operator-supplied ad-hoc `extract_url` input).
pub fn hostname_of(url: &str) -> Option<String> {
    url::Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_owned))
}

/// Normalize a hostname by stripping a leading `www.`, used when matching
/// patterns across the `www.` boundary (§3 pattern/hostname invariant).
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
