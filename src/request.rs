//! Turns a selection and its parameters into the single HTTP call sent to the service.

use crate::{
    config::ClassifierConfig,
    error::ClassifyError,
    model::{InferenceParameters, InputSelection, OutputFormat},
};
use reqwest::Url;

/// Content type used when the image travels in the body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Payload of an inference call.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    /// The image is referenced through the `image` query parameter.
    Empty,
    /// Base64 image bytes, sent with [`FORM_CONTENT_TYPE`].
    FormEncoded(String),
}

/// A fully built `POST` to the inference endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct InferenceRequest {
    pub url: Url,
    pub body: RequestBody,
}

impl InferenceRequest {
    pub fn query(&self) -> &str {
        self.url.query().unwrap_or_default()
    }
}

/// Builds the request for `selection`.
///
/// Files travel base64-encoded in the body; URLs travel in the `image`
/// query parameter with an empty body. `labels` is only sent for image output.
pub fn build_request(
    config: &ClassifierConfig,
    params: &InferenceParameters,
    selection: &InputSelection,
) -> Result<InferenceRequest, ClassifyError> {
    let mut url = config.endpoint()?;

    let body = {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("api_key", &config.api_key)
            .append_pair("confidence", &params.confidence().to_string())
            .append_pair("overlap", &params.overlap().to_string())
            .append_pair("format", params.output_format.as_str());

        if params.output_format == OutputFormat::Image {
            query.append_pair("labels", if params.show_labels { "on" } else { "off" });
        }

        match selection {
            InputSelection::File(blob) => {
                let data_url = blob.to_data_url();
                RequestBody::FormEncoded(strip_data_url_prefix(&data_url).to_string())
            }
            InputSelection::Url(image_url) => {
                query.append_pair("image", image_url);
                RequestBody::Empty
            }
        }
    };

    Ok(InferenceRequest { url, body })
}

/// Drops the `data:<type>;base64,` header, keeping the payload.
///
/// Text without a comma is returned unchanged.
pub fn strip_data_url_prefix(data_url: &str) -> &str {
    data_url
        .split_once(',')
        .map(|(_, payload)| payload)
        .unwrap_or(data_url)
}
