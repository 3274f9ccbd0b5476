use crate::{
    config::ClassifierConfig,
    error::ClassifyError,
    render::HttpReply,
    request::{FORM_CONTENT_TYPE, InferenceRequest, RequestBody},
};
use std::future::Future;

/// Sends a built request to the inference service.
///
/// The controller is generic over this trait so the wire can be swapped for a
/// scripted double in tests. Implementations must not retry.
pub trait InferenceTransport: Send + Sync {
    /// Performs exactly one call and returns whatever status came back.
    ///
    /// Only failures to obtain a response are errors; status handling is left
    /// to the caller.
    fn send(
        &self,
        request: InferenceRequest,
    ) -> impl Future<Output = Result<HttpReply, ClassifyError>> + Send;
}

/// [`InferenceTransport`] backed by a `reqwest` client.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds the client, applying the configured timeout if any.
    pub fn new(config: &ClassifierConfig) -> Result<Self, ClassifyError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl InferenceTransport for HttpTransport {
    async fn send(&self, request: InferenceRequest) -> Result<HttpReply, ClassifyError> {
        log::debug!("POST {}{}", request.url.origin().ascii_serialization(), request.url.path());

        let mut builder = self.client.post(request.url);
        if let RequestBody::FormEncoded(payload) = request.body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(payload);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        log::debug!("Inference service answered {} with {} bytes", status, body.len());

        Ok(HttpReply { status, body })
    }
}
