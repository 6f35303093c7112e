//! Page acquisition collaborators. The core never performs network I/O
//! itself; it consumes whatever text a [`PageFetcher`] hands it. Browser
//! automation lives outside this crate entirely.

use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::records::ExtractionRequest;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Return the raw text (or HTML) of one subject/term results page.
    async fn fetch_page(&self, request: &ExtractionRequest) -> Result<String>;
}

/// Plain HTTP fetch of a schedule-search URL with term/subject as query
/// parameters. HTML responses are reduced to line/tab text for the tokenizer.
pub struct HttpPageFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPageFetcher {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, base_url: base_url.into() })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, request: &ExtractionRequest) -> Result<String> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("term", request.term.as_str()), ("subject", request.subject.as_str())])
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        debug!(url = %self.base_url, bytes = body.len(), "fetched results page");
        Ok(reduce(body))
    }
}

/// Reads a saved results-page dump. Used by the CLI and the offline
/// validation workflow.
pub struct FilePageFetcher {
    path: PathBuf,
}

impl FilePageFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PageFetcher for FilePageFetcher {
    async fn fetch_page(&self, _request: &ExtractionRequest) -> Result<String> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        Ok(reduce(body))
    }
}

fn reduce(body: String) -> String {
    if looks_like_html(&body) {
        html_to_text(&body)
    } else {
        body
    }
}

fn looks_like_html(body: &str) -> bool {
    let lowered = body.to_lowercase();
    lowered.contains("<html") || lowered.contains("<table") || lowered.contains("<td")
}

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script>").unwrap());
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b.*?</style>").unwrap());
static CELL_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</t[dh]>").unwrap());
static ROW_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</tr>|<br\s*/?>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Reduce an HTML results page to the text the tokenizer expects: cell
/// boundaries become tabs and row boundaries newlines. This is a text
/// reduction, not an HTML parser.
pub fn html_to_text(html: &str) -> String {
    let stripped = SCRIPT_RE.replace_all(html, "");
    let stripped = STYLE_RE.replace_all(&stripped, "");
    let with_cells = CELL_END_RE.replace_all(&stripped, "\t");
    let with_rows = ROW_BREAK_RE.replace_all(&with_cells, "\n");
    let no_tags = TAG_RE.replace_all(&with_rows, "");
    let decoded = no_tags
        .replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">");

    let mut out = String::with_capacity(decoded.len());
    for line in decoded.lines() {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    BLANK_RUN_RE.replace_all(&out, "\n\n").into_owned()
}
