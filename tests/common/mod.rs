// 集成测试公共模块
//
// 按浏览器保存网页时的格式拼出 MHTML 归档

#![allow(dead_code)]

use base64::{prelude::BASE64_STANDARD, Engine};

pub const BOUNDARY: &str = "----MultipartBoundary--7LwGy1m3bQ";

/// A 1x1 transparent PNG
pub const PNG_PIXEL: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x60,
    0x00, 0x02, 0x00, 0x00, 0x05, 0x00, 0x01, 0xe9, 0xfa, 0xdc, 0xd8, 0x00, 0x00, 0x00, 0x00,
    0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

#[derive(Clone, Debug)]
struct Part {
    location: String,
    content_type: String,
    transfer_encoding: Option<String>,
    content_id: Option<String>,
    body: Vec<u8>,
}

/// MHTML 归档构造器
#[derive(Clone, Debug, Default)]
pub struct MhtmlBuilder {
    parts: Vec<Part>,
}

impl MhtmlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a part without a transfer encoding
    pub fn part(mut self, location: &str, content_type: &str, body: &[u8]) -> Self {
        self.parts.push(Part {
            location: location.to_string(),
            content_type: content_type.to_string(),
            transfer_encoding: None,
            content_id: None,
            body: body.to_vec(),
        });
        self
    }

    /// Adds a base64 encoded part, wrapped at 76 columns
    pub fn base64_part(mut self, location: &str, content_type: &str, body: &[u8]) -> Self {
        let encoded = BASE64_STANDARD.encode(body);
        let wrapped = encoded
            .as_bytes()
            .chunks(76)
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect::<Vec<String>>()
            .join("\r\n");

        self.parts.push(Part {
            location: location.to_string(),
            content_type: content_type.to_string(),
            transfer_encoding: Some("base64".to_string()),
            content_id: None,
            body: wrapped.into_bytes(),
        });
        self
    }

    /// Adds a part with a raw body and an explicit transfer encoding
    pub fn encoded_part(
        mut self,
        location: &str,
        content_type: &str,
        transfer_encoding: &str,
        body: &[u8],
    ) -> Self {
        self.parts.push(Part {
            location: location.to_string(),
            content_type: content_type.to_string(),
            transfer_encoding: Some(transfer_encoding.to_string()),
            content_id: None,
            body: body.to_vec(),
        });
        self
    }

    /// Gives the most recently added part a `Content-ID`
    pub fn content_id(mut self, content_id: &str) -> Self {
        if let Some(part) = self.parts.last_mut() {
            part.content_id = Some(content_id.to_string());
        }
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.build_with_header(&format!(
            "Content-Type: multipart/related;\r\n\ttype=\"text/html\";\r\n\tboundary=\"{BOUNDARY}\"\r\n"
        ))
    }

    /// Builds the archive with a custom top-level `Content-Type` header block
    pub fn build_with_header(&self, content_type_header: &str) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::new();

        out.extend_from_slice(b"From: <Saved by Blink>\r\n");
        out.extend_from_slice(b"Snapshot-Content-Location: http://example.com/index.html\r\n");
        out.extend_from_slice(b"Subject: Example\r\n");
        out.extend_from_slice(b"MIME-Version: 1.0\r\n");
        out.extend_from_slice(content_type_header.as_bytes());
        out.extend_from_slice(b"\r\n\r\n");

        for part in &self.parts {
            out.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            out.extend_from_slice(format!("Content-Type: {}\r\n", part.content_type).as_bytes());
            if let Some(content_id) = &part.content_id {
                out.extend_from_slice(format!("Content-ID: <{content_id}>\r\n").as_bytes());
            }
            if let Some(encoding) = &part.transfer_encoding {
                out.extend_from_slice(
                    format!("Content-Transfer-Encoding: {encoding}\r\n").as_bytes(),
                );
            }
            out.extend_from_slice(format!("Content-Location: {}\r\n", part.location).as_bytes());
            out.extend_from_slice(b"\r\n");
            out.extend_from_slice(&part.body);
            out.extend_from_slice(b"\r\n");
        }

        out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        out
    }
}

/// Scenario archive: a page, its stylesheet and the stylesheet's background image
pub fn styled_page() -> MhtmlBuilder {
    MhtmlBuilder::new()
        .part(
            "http://example.com/index.html",
            "text/html",
            br#"<!DOCTYPE html><html><head><title>Styled Page</title><link rel="stylesheet" href="style.css"></head><body><p>Hello</p></body></html>"#,
        )
        .part("style.css", "text/css", b"body{background:url(bg.png)}")
        .base64_part("bg.png", "image/png", PNG_PIXEL)
}

/// Extracts the first `attribute="..."` value that starts with `prefix`
pub fn attribute_value<'a>(html: &'a str, attribute: &str, prefix: &str) -> Option<&'a str> {
    let needle = format!("{attribute}=\"{prefix}");
    let start = html.find(&needle)? + attribute.len() + 2;
    let end = start + html[start..].find('"')?;
    Some(&html[start..end])
}

/// Decodes the payload of a `data:<type>;base64,<payload>` URL
pub fn data_url_payload(data_url: &str) -> Vec<u8> {
    let (_, payload) = data_url.split_once(";base64,").expect("not a base64 data URL");
    BASE64_STANDARD.decode(payload).expect("invalid base64 payload")
}
