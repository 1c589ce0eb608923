use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

lazy_static! {
    static ref SEL_H1: Selector = Selector::parse("h1").expect("valid selector");
    static ref SEL_OG_TITLE: Selector =
        Selector::parse(r#"meta[property="og:title"]"#).expect("valid selector");
    static ref SEL_TITLE: Selector = Selector::parse("title").expect("valid selector");
    static ref SEL_P: Selector = Selector::parse("p").expect("valid selector");
    static ref SEL_TIME: Selector = Selector::parse("time").expect("valid selector");
    static ref SEL_META_DATE: Selector =
        Selector::parse(r#"meta[property="article:published_time"]"#).expect("valid selector");
    static ref SEL_A: Selector = Selector::parse("a[href]").expect("valid selector");
    static ref WS: Regex = Regex::new(r"\s+").expect("valid regex");
}

#[derive(Debug, Clone)]
pub struct ArticleParts {
    pub title: String,
    pub content: String,
    pub publish_date: Option<String>,
    pub outgoing_links: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Present only when the page passed the article checks.
    pub article: Option<ArticleParts>,
    /// Same-domain, pattern-matching links, normalized and deduplicated.
    pub links: Vec<String>,
}

/// Content-extraction seam. The frontier only needs "an article or not,
/// plus links"; site-specific heuristics live behind this trait.
pub trait Extract: Send + Sync {
    fn extract(&self, url: &Url, html: &str) -> Extraction;
}

/// Generic HTML extractor: headline from h1/og:title/title, body text from
/// paragraph elements (which sidesteps script/nav/ad chrome), publish date
/// from `<time>` or article meta, links from anchors.
pub struct HtmlExtractor {
    article_pattern: Regex,
    min_content_chars: usize,
}

impl HtmlExtractor {
    pub fn new(article_pattern: Regex, min_content_chars: usize) -> Self {
        Self {
            article_pattern,
            min_content_chars,
        }
    }
}

impl Extract for HtmlExtractor {
    fn extract(&self, url: &Url, html: &str) -> Extraction {
        let doc = Html::parse_document(html);
        let links = extract_links(&doc, url, &self.article_pattern);

        if !self.article_pattern.is_match(url.as_str()) {
            return Extraction { article: None, links };
        }
        let title = headline(&doc);
        let content = body_text(&doc);
        if title.is_empty() || content.chars().count() < self.min_content_chars {
            return Extraction { article: None, links };
        }
        Extraction {
            article: Some(ArticleParts {
                title,
                content,
                publish_date: publish_date(&doc),
                outgoing_links: links.clone(),
            }),
            links,
        }
    }
}

/// Strip the fragment and any trailing slash so url equality is stable
/// across the visited set, the corpus, and the link graph.
pub fn normalize_url(url: &Url) -> String {
    let mut u = url.clone();
    u.set_fragment(None);
    let s = u.to_string();
    s.strip_suffix('/').map_or(s.clone(), |t| t.to_string())
}

fn same_domain(a: &Url, b: &Url) -> bool {
    let host = |u: &Url| {
        u.host_str()
            .map(|h| h.strip_prefix("www.").unwrap_or(h).to_string())
    };
    match (host(a), host(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn extract_links(doc: &Html, base: &Url, pattern: &Regex) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut links = Vec::new();
    for a in doc.select(&SEL_A) {
        let Some(href) = a.value().attr("href") else { continue };
        let Ok(joined) = Url::parse(href).or_else(|_| base.join(href)) else {
            continue;
        };
        if !joined.scheme().starts_with("http") {
            continue;
        }
        if !same_domain(&joined, base) {
            continue;
        }
        let normalized = normalize_url(&joined);
        if !pattern.is_match(&normalized) {
            continue;
        }
        if seen.insert(normalized.clone()) {
            links.push(normalized);
        }
    }
    links
}

fn headline(doc: &Html) -> String {
    let mut candidates: Vec<String> = Vec::new();
    if let Some(h1) = doc.select(&SEL_H1).next() {
        candidates.push(h1.text().collect::<String>());
    }
    if let Some(meta) = doc.select(&SEL_OG_TITLE).next() {
        candidates.push(meta.value().attr("content").unwrap_or_default().to_string());
    }
    if let Some(title) = doc.select(&SEL_TITLE).next() {
        candidates.push(title.text().collect::<String>());
    }
    for raw in candidates {
        // Site names ride after a pipe separator.
        let cleaned = raw.split('|').next().unwrap_or("").trim().to_string();
        if !cleaned.is_empty() {
            return cleaned;
        }
    }
    String::new()
}

fn body_text(doc: &Html) -> String {
    let joined = doc
        .select(&SEL_P)
        .map(|p| p.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");
    WS.replace_all(joined.trim(), " ").to_string()
}

fn publish_date(doc: &Html) -> Option<String> {
    if let Some(time) = doc.select(&SEL_TIME).next() {
        if let Some(dt) = time.value().attr("datetime") {
            return Some(dt.trim().to_string());
        }
        let text = time.text().collect::<String>().trim().to_string();
        if text.len() > 5 {
            return Some(text);
        }
    }
    doc.select(&SEL_META_DATE)
        .next()
        .and_then(|m| m.value().attr("content"))
        .map(|c| c.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> HtmlExtractor {
        HtmlExtractor::new(Regex::new(r"/news/\d+").unwrap(), 20)
    }

    const ARTICLE: &str = r#"<html><head><title>تیتر خبر | خبرگزاری</title>
        <meta property="article:published_time" content="2024-05-01T10:00:00Z">
        </head><body><h1>تیتر اصلی خبر</h1>
        <script>var ads = "noise";</script>
        <p>متن کامل خبر درباره بازار سرمایه و رشد شاخص که به اندازه کافی طولانی است.</p>
        <a href="/news/123">خبر دیگر</a>
        <a href="/news/123#comments">تکراری</a>
        <a href="/about">درباره ما</a>
        <a href="https://other.com/news/9">خارجی</a>
        </body></html>"#;

    #[test]
    fn article_page_yields_document_parts() {
        let url = Url::parse("https://news.ir/news/555").unwrap();
        let out = extractor().extract(&url, ARTICLE);
        let article = out.article.expect("article extracted");
        assert_eq!(article.title, "تیتر اصلی خبر");
        assert!(article.content.contains("بازار سرمایه"));
        assert!(!article.content.contains("noise"));
        assert_eq!(article.publish_date.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(out.links, vec!["https://news.ir/news/123".to_string()]);
    }

    #[test]
    fn non_article_url_returns_links_only() {
        let url = Url::parse("https://news.ir/").unwrap();
        let out = extractor().extract(&url, ARTICLE);
        assert!(out.article.is_none());
        assert_eq!(out.links.len(), 1);
    }

    #[test]
    fn short_body_is_rejected() {
        let url = Url::parse("https://news.ir/news/1").unwrap();
        let html = "<html><body><h1>تیتر</h1><p>کوتاه</p></body></html>";
        let out = extractor().extract(&url, html);
        assert!(out.article.is_none());
    }

    #[test]
    fn missing_title_is_rejected() {
        let url = Url::parse("https://news.ir/news/1").unwrap();
        let html = "<html><body><p>متن به اندازه کافی طولانی برای گذر از آستانه حداقل.</p></body></html>";
        let out = extractor().extract(&url, html);
        assert!(out.article.is_none());
    }

    #[test]
    fn url_normalization() {
        let u = Url::parse("https://news.ir/news/9/#x").unwrap();
        assert_eq!(normalize_url(&u), "https://news.ir/news/9");
    }
}
