//! Turns the service's answer into something the page can show.

use crate::{
    error::ClassifyError,
    model::{ImageHandle, OutputFormat, ResultPayload},
};

/// Raw HTTP answer handed back by a transport.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Converts `reply` into a payload of the requested `format`.
///
/// Non-2xx statuses fail regardless of format. JSON bodies are re-emitted
/// with two-space indentation and their key order preserved; image bodies
/// are kept as opaque bytes.
pub fn render_reply(
    format: OutputFormat,
    reply: HttpReply,
) -> Result<ResultPayload, ClassifyError> {
    if !reply.is_success() {
        return Err(ClassifyError::Status {
            status: reply.status,
        });
    }

    match format {
        OutputFormat::Json => {
            let value: serde_json::Value = serde_json::from_slice(&reply.body)?;
            Ok(ResultPayload::Json(serde_json::to_string_pretty(&value)?))
        }
        OutputFormat::Image => Ok(ResultPayload::Image(ImageHandle::new(reply.body))),
    }
}
