//! MHTML 解码
//!
//! 归档是一封 `multipart/related` 邮件。每个顶层部分成为一个资源，以
//! `Content-Location` 为键；第一个 `text/html` 部分是入口文档。只解码
//! base64 传输编码，其余编码（包括 quoted-printable）原样保留。

use mailparse::{body::Body, parse_mail, MailHeaderMap, ParsedMail};

use crate::capabilities::{minify_or_keep, Minifier};
use crate::core::{MhtmlError, MhtmlResult};
use crate::store::{has_media_type, media_type_of, Resource, ResourceStore};
use crate::utils::url::BaseUrl;

/// 解码整个归档
///
/// 任何一个部分出错都会使整个解码失败，不会返回部分结果。
pub fn decode_archive(input: &[u8], minifier: Option<&dyn Minifier>) -> MhtmlResult<ResourceStore> {
    let message = parse_mail(input).map_err(|e| MhtmlError::Container(e.to_string()))?;
    check_container(&message)?;

    let mut store = ResourceStore::new();

    for part in message.subparts.iter() {
        let (mut resource, content_id) = decode_part(part, minifier)?;

        if let Some(content_id) = content_id {
            store.register_content_id(&content_id, &resource.location);
        }

        if store.entry_location().is_none() && has_media_type(&resource.content_type, "text/html") {
            resource.is_initial = true;
            store.set_entry_location(&resource.location);
        }

        tracing::debug!(
            "decoded part \"{}\" ({}, {} bytes)",
            resource.location,
            resource.content_type,
            resource.data.len()
        );

        let location = resource.location.clone();
        if store.insert(resource).is_some() {
            tracing::debug!("part \"{}\" replaces an earlier part with the same location", location);
        }
    }

    if store.entry_location().is_none() {
        return Err(MhtmlError::NoEntryDocument);
    }

    Ok(store)
}

/// 去掉引号、撇号和空格，使类型可以直接嵌入 data URL
pub fn normalize_content_type(content_type: &str) -> String {
    content_type.replace(['"', '\'', ' '], "")
}

fn check_container(message: &ParsedMail) -> MhtmlResult<()> {
    if message.headers.get_first_value("Content-Type").is_none() {
        return Err(MhtmlError::Container("missing Content-Type header".to_string()));
    }

    if !message.ctype.mimetype.starts_with("multipart/") {
        return Err(MhtmlError::Container(format!(
            "expected a multipart message, found {}",
            message.ctype.mimetype
        )));
    }

    if !message.ctype.params.contains_key("boundary") {
        return Err(MhtmlError::Container("missing boundary parameter".to_string()));
    }

    Ok(())
}

fn decode_part(
    part: &ParsedMail,
    minifier: Option<&dyn Minifier>,
) -> MhtmlResult<(Resource, Option<String>)> {
    let location = part
        .headers
        .get_first_value("Content-Location")
        .unwrap_or_default();
    let content_type = normalize_content_type(
        &part
            .headers
            .get_first_value("Content-Type")
            .unwrap_or_default(),
    );

    let base_url = BaseUrl::parse(&location).map_err(|e| MhtmlError::ReferenceResolution {
        location: location.clone(),
        reason: e.to_string(),
    })?;

    let mut data = match part.get_body_encoded() {
        Body::Base64(body) => body.get_decoded().map_err(|e| MhtmlError::Encoding {
            location: location.clone(),
            reason: e.to_string(),
        })?,
        Body::QuotedPrintable(body) => strip_delimiter_newline(body.get_raw()).to_vec(),
        Body::SevenBit(body) | Body::EightBit(body) => {
            strip_delimiter_newline(body.get_raw()).to_vec()
        }
        Body::Binary(body) => strip_delimiter_newline(body.get_raw()).to_vec(),
    };

    if let Some(minifier) = minifier {
        let media_type = media_type_of(&content_type).to_ascii_lowercase();
        data = minify_or_keep(minifier, &media_type, data);
    }

    let content_id = part
        .headers
        .get_first_value("Content-ID")
        .map(|content_id| {
            content_id
                .trim()
                .trim_matches(|c: char| c == '<' || c == '>')
                .to_string()
        })
        .filter(|content_id| !content_id.is_empty());

    Ok((Resource::new(&location, &content_type, base_url, data), content_id))
}

/// 分隔符前的换行属于分隔符本身，不是正文
fn strip_delimiter_newline(body: &[u8]) -> &[u8] {
    body.strip_suffix(b"\r\n")
        .or_else(|| body.strip_suffix(b"\n"))
        .unwrap_or(body)
}
