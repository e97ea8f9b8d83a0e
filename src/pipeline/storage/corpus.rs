//! Knowledge corpus on disk.
//!
//! The corpus is a flat directory of `.txt`/`.md` files, one per source page.
//! When the directory is missing or empty it is populated by fetching the
//! public fact sheets in [`KNOWLEDGE_SOURCES`] and reducing their HTML to text.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use super::types::KnowledgeDocument;
use super::StorageError;

/// Public health fact sheets the corpus is built from.
pub const KNOWLEDGE_SOURCES: &[&str] = &[
    "https://www.who.int/news-room/fact-sheets/detail/hypertension",
    "https://www.who.int/news-room/fact-sheets/detail/diabetes",
    "https://www.who.int/news-room/fact-sheets/detail/obesity",
    "https://www.cdc.gov/cholesterol/facts.html",
    "https://www.cdc.gov/tobacco/data_statistics/fact_sheets/index.htm",
    "https://www.heart.org/en/health-topics/high-blood-pressure/understanding-blood-pressure-readings",
    "https://www.cdc.gov/heart-disease/about/index.html",
    "https://www.niddk.nih.gov/health-information/diabetes/overview/preventing-problems/heart-disease-stroke",
    "https://www.cdc.gov/obesity/risk-factors/risk-factors.html",
    "https://www.who.int/news-room/fact-sheets/detail/obesity-and-overweight",
    "https://www.mayoclinic.org/tests-procedures/blood-pressure-test/about/pac-20393098",
];

const FETCH_TIMEOUT_SECS: u64 = 30;
const CORPUS_EXTENSIONS: &[&str] = &["txt", "md"];

/// Source of raw page bodies (allows mocking).
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<String, StorageError>;
}

/// Fetches pages over HTTP with a blocking client.
pub struct HttpPageFetcher {
    client: reqwest::blocking::Client,
}

impl HttpPageFetcher {
    pub fn new() -> Result<Self, StorageError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .user_agent(concat!("vitalcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StorageError::Fetch {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpPageFetcher {
    fn fetch(&self, url: &str) -> Result<String, StorageError> {
        let fetch_err = |reason: String| StorageError::Fetch {
            url: url.to_string(),
            reason,
        };
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| fetch_err(e.to_string()))?;
        if !response.status().is_success() {
            return Err(fetch_err(format!("HTTP {}", response.status())));
        }
        response.text().map_err(|e| fetch_err(e.to_string()))
    }
}

/// Load every corpus file under `dir`, sorted by file name.
pub fn load_dir(dir: &Path) -> Result<Vec<KnowledgeDocument>, StorageError> {
    if !dir.is_dir() {
        return Err(StorageError::CorpusUnreadable(dir.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && has_corpus_extension(p))
        .collect();
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let text = std::fs::read_to_string(&path)?;
        if text.trim().is_empty() {
            continue;
        }
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        documents.push(KnowledgeDocument { source, text });
    }
    Ok(documents)
}

/// Fetch each source, reduce it to text and persist it under `dir`.
/// Sources that fail are logged and skipped.
pub fn build_from_sources(
    dir: &Path,
    sources: &[&str],
    fetcher: &impl PageFetcher,
) -> Result<Vec<KnowledgeDocument>, StorageError> {
    std::fs::create_dir_all(dir)?;

    let mut documents = Vec::new();
    for url in sources {
        let html = match fetcher.fetch(url) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(url, error = %e, "Skipping knowledge source");
                continue;
            }
        };
        let text = html_to_text(&html);
        if text.is_empty() {
            tracing::warn!(url, "Knowledge source has no readable text");
            continue;
        }

        let file_name = format!("{}.txt", slugify(url));
        std::fs::write(dir.join(&file_name), &text)?;
        tracing::debug!(url, file = %file_name, chars = text.len(), "Knowledge source saved");
        documents.push(KnowledgeDocument {
            source: url.to_string(),
            text,
        });
    }

    tracing::info!(
        dir = %dir.display(),
        fetched = documents.len(),
        requested = sources.len(),
        "Knowledge corpus built"
    );
    Ok(documents)
}

/// Load the corpus from `dir`, building it from `sources` first when the
/// directory is missing or holds no documents.
pub fn load_or_build(
    dir: &Path,
    sources: &[&str],
    fetcher: &impl PageFetcher,
) -> Result<Vec<KnowledgeDocument>, StorageError> {
    if dir.is_dir() {
        let documents = load_dir(dir)?;
        if !documents.is_empty() {
            tracing::info!(dir = %dir.display(), documents = documents.len(), "Knowledge corpus loaded");
            return Ok(documents);
        }
    }

    let documents = build_from_sources(dir, sources, fetcher)?;
    if documents.is_empty() {
        return Err(StorageError::CorpusUnreadable(dir.to_path_buf()));
    }
    Ok(documents)
}

fn has_corpus_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| CORPUS_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|noscript|svg|head)\b.*?</(script|style|noscript|svg|head)>")
        .expect("invalid script regex")
});
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("invalid comment regex"));
static BLOCK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(p|div|br|h[1-6]|li|ul|ol|tr|table|section|article|header|footer)\b[^>]*>")
        .expect("invalid block tag regex")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("invalid tag regex"));
static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("invalid blank line regex"));
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("invalid slug regex"));

/// Reduce an HTML page to paragraphs of plain text.
pub fn html_to_text(html: &str) -> String {
    let text = SCRIPT_STYLE_RE.replace_all(html, " ");
    let text = COMMENT_RE.replace_all(&text, " ");
    let text = BLOCK_TAG_RE.replace_all(&text, "\n\n");
    let text = TAG_RE.replace_all(&text, " ");
    let text = decode_entities(&text);

    let lines: Vec<String> = text
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    BLANK_LINES_RE
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

/// File-name slug for a source URL.
pub fn slugify(url: &str) -> String {
    let lowercase = url.to_lowercase();
    let trimmed = lowercase
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.");
    let replaced = SLUG_RE.replace_all(trimmed, "-");
    let slug = replaced.trim_matches('-');
    if slug.is_empty() {
        "source".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapFetcher(HashMap<&'static str, &'static str>);

    impl PageFetcher for MapFetcher {
        fn fetch(&self, url: &str) -> Result<String, StorageError> {
            self.0
                .get(url)
                .map(|s| s.to_string())
                .ok_or_else(|| StorageError::Fetch {
                    url: url.to_string(),
                    reason: "HTTP 404".into(),
                })
        }
    }

    #[test]
    fn html_to_text_strips_markup() {
        let html = r#"<html><head><title>x</title></head><body>
            <script>var a = 1;</script>
            <h1>Hypertension</h1><p>Blood pressure &amp; <b>you</b>.</p>
            <!-- nav --><ul><li>Eat less salt</li></ul></body></html>"#;
        let text = html_to_text(html);
        assert!(text.starts_with("Hypertension"));
        assert!(text.contains("Blood pressure & you ."));
        assert!(text.contains("Eat less salt"));
        assert!(!text.contains("var a"));
        assert!(!text.contains('<'));
        assert!(!text.contains("\n\n\n"));
    }

    #[test]
    fn slugify_url() {
        assert_eq!(
            slugify("https://www.who.int/news-room/fact-sheets/detail/hypertension"),
            "who-int-news-room-fact-sheets-detail-hypertension"
        );
        assert_eq!(slugify("https://"), "source");
    }

    #[test]
    fn load_dir_reads_sorted_text_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.md"), "Second").unwrap();
        std::fs::write(dir.path().join("a.txt"), "First").unwrap();
        std::fs::write(dir.path().join("empty.txt"), "   ").unwrap();
        std::fs::write(dir.path().join("image.png"), "binary").unwrap();

        let docs = load_dir(dir.path()).unwrap();
        let sources: Vec<_> = docs.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(sources, ["a.txt", "b.md"]);
        assert_eq!(docs[0].text, "First");
    }

    #[test]
    fn load_dir_missing_is_error() {
        let err = load_dir(Path::new("/nonexistent/corpus")).unwrap_err();
        assert!(matches!(err, StorageError::CorpusUnreadable(_)));
    }

    #[test]
    fn load_or_build_prefers_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("local.md"), "Local notes").unwrap();
        let fetcher = MapFetcher(HashMap::new());

        let docs = load_or_build(dir.path(), &["https://example.org/a"], &fetcher).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "local.md");
    }

    #[test]
    fn load_or_build_fetches_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("knowledge");
        let fetcher = MapFetcher(HashMap::from([(
            "https://example.org/bp",
            "<p>Normal blood pressure is below 120/80.</p>",
        )]));

        let docs = load_or_build(
            &corpus,
            &["https://example.org/bp", "https://example.org/gone"],
            &fetcher,
        )
        .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "Normal blood pressure is below 120/80.");

        let saved = std::fs::read_to_string(corpus.join("example-org-bp.txt")).unwrap();
        assert_eq!(saved, docs[0].text);

        // Second call reads back from disk.
        let reloaded = load_or_build(&corpus, &[], &MapFetcher(HashMap::new())).unwrap();
        assert_eq!(reloaded[0].source, "example-org-bp.txt");
    }

    #[test]
    fn load_or_build_with_nothing_fetched_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_or_build(dir.path(), &["https://example.org/x"], &MapFetcher(HashMap::new()));
        assert!(matches!(result, Err(StorageError::CorpusUnreadable(_))));
    }

    #[test]
    fn http_fetcher_reads_body_and_rejects_errors() {
        let mut server = mockito::Server::new();
        let ok = server
            .mock("GET", "/sheet")
            .with_status(200)
            .with_body("<p>Sheet</p>")
            .create();
        let missing = server.mock("GET", "/missing").with_status(404).create();

        let fetcher = HttpPageFetcher::new().unwrap();
        assert_eq!(fetcher.fetch(&format!("{}/sheet", server.url())).unwrap(), "<p>Sheet</p>");
        assert!(matches!(
            fetcher.fetch(&format!("{}/missing", server.url())),
            Err(StorageError::Fetch { .. })
        ));
        ok.assert();
        missing.assert();
    }
}
