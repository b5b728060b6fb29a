use encoding_rs::{Encoding, UTF_8};
use html5ever::serialize::{serialize, SerializeOpts};
use markup5ever_rcdom::{RcDom, SerializableHandle};

use crate::core::{MhtmlError, MhtmlResult};

/// 序列化文档
///
/// html5ever 总是输出 UTF-8；文档按其他编码解析时，结果重新编码回该编码。
pub fn serialize_document(dom: &RcDom, document_encoding: &'static Encoding) -> MhtmlResult<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = dom.document.clone().into();
    serialize(&mut buf, &serializable, SerializeOpts::default()).map_err(MhtmlError::Serialize)?;

    if document_encoding != UTF_8 {
        let s: &str = &String::from_utf8_lossy(&buf);
        let (data, _, _) = document_encoding.encode(s);
        buf = data.into_owned();
    }

    Ok(buf)
}
