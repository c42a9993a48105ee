//! `data:` URI and base64 handling for media parts
//!
//! Inbound media arrives either as a full `data:<type>[;base64],<payload>`
//! URI or as a bare base64 payload paired with a declared content type.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::LlmError;

/// Content type used when neither the part nor the URI declares one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const DATA_URI_PREFIX: &str = "data:";
const BASE64_TOKEN: &str = "base64";

/// Decoded media payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedData {
    /// Media type, parameters included (e.g. "text/plain;charset=utf-8")
    pub content_type: String,
    /// Raw bytes
    pub data: Vec<u8>,
}

impl DecodedData {
    /// Bare standard-base64 encoding of the payload
    pub fn to_base64(&self) -> String {
        encode_base64(&self.data)
    }

    /// Media type without parameters, lowercased
    pub fn essence(&self) -> String {
        self.content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }
}

/// Decode a media or data part payload
///
/// A `data:` URI carries its own media type, which wins over `content_type`.
/// Anything else is treated as a bare base64 payload of the declared type.
pub fn decode_part(content_type: Option<&str>, payload: &str) -> Result<DecodedData, LlmError> {
    if payload.starts_with(DATA_URI_PREFIX) {
        return parse_data_uri(payload);
    }

    let content_type = content_type
        .filter(|ct| !ct.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE);

    Ok(DecodedData {
        content_type: content_type.to_owned(),
        data: STANDARD.decode(payload)?,
    })
}

/// Parse a `data:<type>[;param]*[;base64],<payload>` URI
pub fn parse_data_uri(uri: &str) -> Result<DecodedData, LlmError> {
    let rest = uri
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or_else(|| LlmError::MalformedDataUri("missing `data:` prefix".to_owned()))?;

    let Some((header, payload)) = rest.split_once(',') else {
        return Err(LlmError::MalformedDataUri("missing `,` after media type".to_owned()));
    };

    let mut segments = header.split(';');
    let media_type = segments.next().unwrap_or_default();

    let mut parameters = Vec::new();
    let mut is_base64 = false;
    for segment in segments {
        if segment == BASE64_TOKEN {
            is_base64 = true;
        } else {
            parameters.push(segment);
        }
    }

    let content_type = if media_type.is_empty() {
        DEFAULT_CONTENT_TYPE.to_owned()
    } else if parameters.is_empty() {
        media_type.to_owned()
    } else {
        format!("{media_type};{}", parameters.join(";"))
    };

    let data = if is_base64 {
        STANDARD.decode(payload)?
    } else {
        payload.as_bytes().to_vec()
    };

    Ok(DecodedData { content_type, data })
}

/// Standard base64 encoding without a `data:` header
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encode bytes as `data:<content_type>;base64,<payload>`
///
/// `parse_data_uri` restores `content_type` exactly, except that an empty
/// content type comes back as `application/octet-stream`.
pub fn encode_data_uri(content_type: &str, data: &[u8]) -> String {
    format!("{DATA_URI_PREFIX}{content_type};{BASE64_TOKEN},{}", STANDARD.encode(data))
}
