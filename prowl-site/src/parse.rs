//! Pure string parsers shared by the page objects.
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static TIME_DATETIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<time datetime="(.*?)""#).expect("static regex"));

/// Split one "how you match" skills line.
///
/// Entries are comma separated; the last entry may join two skills with the
/// locale's "and" word (`"Python, Go e Rust"`).
pub fn parse_skills(text: &str, and_word: &str) -> Vec<String> {
    let tokens: Vec<&str> = text.trim().split(',').collect();
    let Some((last, init)) = tokens.split_last() else {
        return Vec::new();
    };

    let tail: Vec<&str> = if and_word.is_empty() {
        vec![*last]
    } else {
        last.split(and_word).collect()
    };

    init.iter()
        .chain(tail.iter())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split the middot-separated "additional skills" line.
pub fn parse_additional_skills(text: &str) -> Vec<String> {
    text.split('·')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Path segment following `marker` in `href`, e.g. the company slug in
/// `https://site/company/acme-corp/people/` for marker `company/`.
pub fn slug_after(href: &str, marker: &str) -> Option<String> {
    let rest = href.split_once(marker)?.1;
    let slug = rest.split(['/', '?', '#']).next()?.trim();
    (!slug.is_empty()).then(|| slug.to_string())
}

/// `datetime` attribute of the first `<time>` tag in `html`.
pub fn parse_created_at(html: &str) -> Option<String> {
    TIME_DATETIME
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Job id from a posting URL: `/jobs/view/<id>/` or a `currentJobId` query.
pub fn parse_job_id_from_url(raw: &str) -> Option<u64> {
    if let Some(id) = slug_after(raw, "jobs/view/").and_then(|s| s.parse().ok()) {
        return Some(id);
    }
    let url = Url::parse(raw).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "currentJobId")
        .and_then(|(_, v)| v.parse().ok())
}

/// Validate a card's `data-job-id` attribute.
pub fn parse_card_id(raw: Option<&str>) -> Result<u64, String> {
    let raw = raw.ok_or_else(|| "data-job-id attribute missing".to_string())?;
    raw.trim()
        .parse::<u64>()
        .map_err(|_| format!("data-job-id `{raw}` is not numeric"))
}

/// Collapse runs of whitespace and trim; `None` for blank input.
pub fn clean_text(raw: &str) -> Option<String> {
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!cleaned.is_empty()).then_some(cleaned)
}
