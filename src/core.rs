use chrono::{SecondsFormat, Utc};
use rayon::prelude::*;
use std::io;
use thiserror::Error;

use crate::capabilities::{CharsetDetector, EncodingSniffer, Minifier};
use crate::parsers::charset::transcode_to_utf8;
use crate::parsers::css::rewrite_css;
use crate::parsers::html::{get_title, html_to_dom, HtmlRewriter, RemovalRules};
use crate::parsers::mhtml::decode_archive;
use crate::store::{Resource, ResourceStore};

/// Represents errors that can occur while converting an archive
///
/// Every variant is fatal: a conversion either produces the complete
/// resource set or nothing at all.
#[derive(Error, Debug)]
pub enum MhtmlError {
    /// The container is not a parseable multipart message
    #[error("malformed container: {0}")]
    Container(String),

    /// A base64 part could not be decoded
    #[error("invalid base64 body in part \"{location}\": {reason}")]
    Encoding { location: String, reason: String },

    #[error("no HTML pages to display")]
    NoEntryDocument,

    #[error("unable to parse HTML: {0}")]
    Parse(#[source] io::Error),

    #[error("unable to serialize HTML: {0}")]
    Serialize(#[source] io::Error),

    #[error("unable to convert \"{location}\" from {encoding} to UTF-8")]
    Transcode { location: String, encoding: String },

    /// A Content-Location (or `<base href>`) is not a usable URL
    #[error("invalid location \"{location}\": {reason}")]
    ReferenceResolution { location: String, reason: String },

    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type MhtmlResult<T> = Result<T, MhtmlError>;

/// Configuration options for a conversion
///
/// Selectors are plain strings here; they get compiled (and rejected when
/// malformed) before the archive is decoded.
#[derive(Default, Clone, Debug)]
pub struct ConvertOptions {
    /// Elements matching any of these selectors are removed from every document
    pub remove_elements: Vec<String>,
    /// `(selector, attribute)` pairs whose attribute value gets cleared
    pub remove_attributes: Vec<(String, String)>,
    pub minify: bool,
    /// Fan the per-resource rewrite passes out over the rayon pool
    pub parallel: bool,
}

impl ConvertOptions {
    pub fn validate(&self) -> MhtmlResult<()> {
        RemovalRules::compile(self).map(|_| ())
    }
}

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// 转换器，负责协调整个转换流程
///
/// 解码 → CSS 重写 → 字符集规范化 → HTML 重写，严格按顺序执行；
/// 每个阶段先基于同一份快照计算出全部结果，再统一写回。
pub struct Converter {
    options: ConvertOptions,
    detector: Box<dyn CharsetDetector>,
    minifier: Option<Box<dyn Minifier>>,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        let minifier = if options.minify {
            crate::capabilities::default_minifier()
        } else {
            None
        };

        Self {
            options,
            detector: Box::new(EncodingSniffer),
            minifier,
        }
    }

    pub fn with_detector(mut self, detector: Box<dyn CharsetDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_minifier(mut self, minifier: Option<Box<dyn Minifier>>) -> Self {
        self.minifier = minifier;
        self
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Runs the whole pipeline and returns the rewritten resource set
    pub fn convert(&self, input: &[u8]) -> MhtmlResult<ResourceStore> {
        let rules = RemovalRules::compile(&self.options)?;

        let mut store = decode_archive(input, self.minifier.as_deref())?;
        tracing::info!(
            "decoded {} resources, entry document \"{}\"",
            store.len(),
            store.entry_location().unwrap_or_default()
        );

        self.rewrite_stylesheets(&mut store)?;
        self.normalize_charsets(&mut store)?;
        self.rewrite_documents(&mut store, &rules)?;

        Ok(store)
    }

    fn rewrite_stylesheets(&self, store: &mut ResourceStore) -> MhtmlResult<()> {
        let snapshot: &ResourceStore = store;
        let rewritten = self.run_pass(snapshot, |resource| {
            Ok(resource
                .is_stylesheet()
                .then(|| rewrite_css(snapshot, &resource.base_url, &resource.data)))
        })?;

        tracing::info!("rewrote {} stylesheets", rewritten.len());
        for (location, data) in rewritten {
            if let Some(resource) = store.get_mut(&location) {
                resource.data = data;
            }
        }

        Ok(())
    }

    fn normalize_charsets(&self, store: &mut ResourceStore) -> MhtmlResult<()> {
        let detector = self.detector.as_ref();
        let transcoded = self.run_pass(store, |resource| {
            if resource.is_html() {
                transcode_to_utf8(resource, detector)
            } else {
                Ok(None)
            }
        })?;

        for (location, outcome) in transcoded {
            if let Some(resource) = store.get_mut(&location) {
                tracing::debug!(
                    "converted \"{}\" from {} to UTF-8",
                    location,
                    outcome.source_encoding
                );
                resource.data = outcome.data;
                resource.content_type = outcome.content_type;
                resource.is_converted = true;
            }
        }

        Ok(())
    }

    fn rewrite_documents(&self, store: &mut ResourceStore, rules: &RemovalRules) -> MhtmlResult<()> {
        let snapshot: &ResourceStore = store;
        let rewriter = HtmlRewriter::new(snapshot, rules)?;
        let rewritten = self.run_pass(snapshot, |resource| {
            if resource.is_html() {
                rewriter
                    .rewrite(&resource.base_url, &resource.data, resource.is_converted)
                    .map(Some)
            } else {
                Ok(None)
            }
        })?;

        tracing::info!("rewrote {} documents", rewritten.len());
        for (location, data) in rewritten {
            if let Some(resource) = store.get_mut(&location) {
                resource.data = data;
            }
        }

        Ok(())
    }

    /// Visits every resource once, collecting `(location, output)` pairs
    fn run_pass<T, F>(&self, store: &ResourceStore, pass: F) -> MhtmlResult<Vec<(String, T)>>
    where
        T: Send,
        F: Fn(&Resource) -> MhtmlResult<Option<T>> + Sync + Send,
    {
        let visit = |(location, resource): (&String, &Resource)| {
            pass(resource).map(|outcome| outcome.map(|value| (location.clone(), value)))
        };

        let outcomes: Vec<Option<(String, T)>> = if self.options.parallel {
            store
                .resources()
                .par_iter()
                .map(visit)
                .collect::<MhtmlResult<_>>()?
        } else {
            store
                .resources()
                .iter()
                .map(visit)
                .collect::<MhtmlResult<_>>()?
        };

        Ok(outcomes.into_iter().flatten().collect())
    }
}

/// Converts an archive with default capabilities
pub fn convert_archive(input: &[u8], options: ConvertOptions) -> MhtmlResult<ResourceStore> {
    Converter::new(options).convert(input)
}

/// 非服务模式下的转换结果
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertOutcome {
    pub entry_location: String,
    pub entry_title: Option<String>,
    /// 全部 HTML 资源按存储顺序拼接
    pub output: Vec<u8>,
}

impl ConvertOutcome {
    pub fn from_store(store: &ResourceStore) -> MhtmlResult<Self> {
        let entry_location = store
            .entry_location()
            .ok_or(MhtmlError::NoEntryDocument)?
            .to_string();

        Ok(Self {
            entry_location,
            entry_title: entry_title(store),
            output: render_documents(store),
        })
    }
}

/// Concatenates every HTML resource in store order
pub fn render_documents(store: &ResourceStore) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();

    for resource in store.html_resources() {
        output.extend_from_slice(&resource.data);
    }

    output
}

/// 入口文档的标题
pub fn entry_title(store: &ResourceStore) -> Option<String> {
    let entry = store.entry()?;
    let dom = html_to_dom(&entry.data, encoding_rs::UTF_8).ok()?;
    get_title(&dom.document)
}

/// Parses Content-Type header value
pub fn parse_content_type(content_type: &str) -> (String, String) {
    let mut media_type = String::new();
    let mut charset = String::new();

    let parts: Vec<&str> = content_type.split(';').collect();

    if !parts.is_empty() {
        media_type = parts[0].trim().to_lowercase();
    }

    for part in parts.iter().skip(1) {
        let part = part.trim();
        let is_charset = part
            .get(..8)
            .is_some_and(|key| key.eq_ignore_ascii_case("charset="));
        if is_charset {
            charset = part[8..].trim_matches(|c: char| c == '"' || c == '\'').to_string();
        }
    }

    (media_type, charset)
}

/// Formats output path with title substitution and sanitization
pub fn format_output_path(path: &str, document_title: Option<&str>) -> String {
    let datetime: &str = &Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let title = document_title.unwrap_or("");

    path.replace("%timestamp%", &datetime.replace(':', "_"))
        .replace(
            "%title%",
            title
                .replace(['/', '\\'], "_")
                .replace('<', "[")
                .replace('>', "]")
                .replace(':', " - ")
                .replace('\"', "")
                .replace('|', "-")
                .replace('?', "")
                .trim_start_matches('.'),
        )
        .replace("%extension%", "html")
        .replace("%ext%", "htm")
}

/// Prints an error message to stderr
pub fn print_error_message(msg: &str) {
    eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
}

/// Prints an info message to stderr, keeping stdout for documents
pub fn print_info_message(msg: &str) {
    eprintln!("{msg}");
}
