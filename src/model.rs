use crate::error::ClassifyError;
use base64::{Engine, prelude::BASE64_STANDARD};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, str::FromStr};

/// Media type given to annotated images returned by the service.
pub const RESULT_IMAGE_MEDIA_TYPE: &str = "image/jpeg";

/// An image file picked by the user, held in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBlob {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl ImageBlob {
    /// Wraps already-read bytes with their file name and media type.
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, deriving its media type from the extension.
    pub fn from_path(path: &Path) -> Result<Self, ClassifyError> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self::new(name, media_type_for_path(path), bytes))
    }

    /// Whether the media type starts with `image/`.
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    /// Length of the file in bytes.
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Size in megabytes with two decimals, e.g. `"1.50 MB"`.
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.bytes.len() as f64 / 1024.0 / 1024.0)
    }

    /// Encodes the blob the way a browser file reader does: `data:<type>;base64,<payload>`.
    pub fn to_data_url(&self) -> String {
        data_url(&self.media_type, &self.bytes)
    }
}

pub(crate) fn data_url(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, BASE64_STANDARD.encode(bytes))
}

/// Guesses a media type from a file extension.
///
/// Unknown extensions map to `application/octet-stream`, which is not an image.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// The image source chosen for the next analysis. File and URL exclude each other.
#[derive(Clone, Debug, PartialEq)]
pub enum InputSelection {
    File(ImageBlob),
    Url(String),
}

impl InputSelection {
    /// `"file"` or `"url"`.
    pub fn kind(&self) -> &'static str {
        match self {
            InputSelection::File(_) => "file",
            InputSelection::Url(_) => "url",
        }
    }
}

/// What the service should send back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The input image with detections drawn on it.
    #[default]
    Image,
    /// Detections as a JSON document.
    Json,
}

impl OutputFormat {
    /// The `format` query value.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Image => "image",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(OutputFormat::Image),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Tunable knobs sent along with every request.
#[derive(Clone, Debug, PartialEq)]
pub struct InferenceParameters {
    /// Minimum confidence, 0 to 100.
    pub confidence_percent: u8,
    /// Maximum box overlap, 0 to 100.
    pub overlap_percent: u8,
    pub output_format: OutputFormat,
    /// Only sent when `output_format` is [`OutputFormat::Image`].
    pub show_labels: bool,
}

impl Default for InferenceParameters {
    fn default() -> Self {
        Self {
            confidence_percent: 50,
            overlap_percent: 50,
            output_format: OutputFormat::Image,
            show_labels: true,
        }
    }
}

impl InferenceParameters {
    /// Confidence as the fraction sent to the service.
    pub fn confidence(&self) -> f64 {
        f64::from(self.confidence_percent.min(100)) / 100.0
    }

    /// Overlap as the fraction sent to the service.
    pub fn overlap(&self) -> f64 {
        f64::from(self.overlap_percent.min(100)) / 100.0
    }

    /// Merges `update` into the parameters, clamping percentages to 0..=100.
    pub fn apply(&mut self, update: ParameterUpdate) {
        if let Some(confidence) = update.confidence_percent {
            self.confidence_percent = clamp_percent("confidence", confidence);
        }
        if let Some(overlap) = update.overlap_percent {
            self.overlap_percent = clamp_percent("overlap", overlap);
        }
        if let Some(format) = update.output_format {
            self.output_format = format;
        }
        if let Some(show_labels) = update.show_labels {
            self.show_labels = show_labels;
        }
    }
}

fn clamp_percent(name: &str, value: u8) -> u8 {
    if value > 100 {
        log::warn!("{name} of {value}% is out of range, clamping to 100%");
        100
    } else {
        value
    }
}

/// A partial change to [`InferenceParameters`]; `None` fields are left alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterUpdate {
    pub confidence_percent: Option<u8>,
    pub overlap_percent: Option<u8>,
    pub output_format: Option<OutputFormat>,
    pub show_labels: Option<bool>,
}

impl ParameterUpdate {
    /// Sets the confidence threshold in percent.
    pub fn confidence(mut self, percent: u8) -> Self {
        self.confidence_percent = Some(percent);
        self
    }

    /// Sets the maximum overlap in percent.
    pub fn overlap(mut self, percent: u8) -> Self {
        self.overlap_percent = Some(percent);
        self
    }

    /// Sets the output format.
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    /// Turns label drawing on or off.
    pub fn labels(mut self, show: bool) -> Self {
        self.show_labels = Some(show);
        self
    }
}

/// An annotated image kept locally so it can be shown or saved.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageHandle {
    bytes: Vec<u8>,
    media_type: &'static str,
}

impl ImageHandle {
    /// Wraps image bytes returned by the service.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            media_type: RESULT_IMAGE_MEDIA_TYPE,
        }
    }

    /// Raw image bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Always `image/jpeg`.
    pub fn media_type(&self) -> &str {
        self.media_type
    }

    /// Inline `data:` URL suitable for an `<img>` source.
    pub fn to_data_url(&self) -> String {
        data_url(self.media_type, &self.bytes)
    }

    /// Writes the image bytes to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ClassifyError> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Outcome of a successful analysis.
#[derive(Clone, Debug, PartialEq)]
pub enum ResultPayload {
    Image(ImageHandle),
    /// Pretty-printed JSON, two-space indented.
    Json(String),
}

impl ResultPayload {
    /// The format this payload was produced for.
    pub fn kind(&self) -> OutputFormat {
        match self {
            ResultPayload::Image(_) => OutputFormat::Image,
            ResultPayload::Json(_) => OutputFormat::Json,
        }
    }

    /// Text placed on the clipboard when the user copies the result.
    pub fn clipboard_text(&self) -> String {
        match self {
            ResultPayload::Image(handle) => handle.to_data_url(),
            ResultPayload::Json(text) => text.clone(),
        }
    }
}

/// Lifecycle of the current classification attempt.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum AnalysisState {
    #[default]
    Idle,
    Running,
    Succeeded(ResultPayload),
    /// Carries the message shown to the user.
    Failed(String),
}

impl AnalysisState {
    /// Returns the state as a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisState::Idle => "idle",
            AnalysisState::Running => "running",
            AnalysisState::Succeeded(_) => "succeeded",
            AnalysisState::Failed(_) => "failed",
        }
    }

    /// Whether a request is in flight.
    pub fn is_running(&self) -> bool {
        matches!(self, AnalysisState::Running)
    }

    /// The payload of a successful analysis, if any.
    pub fn result(&self) -> Option<&ResultPayload> {
        match self {
            AnalysisState::Succeeded(payload) => Some(payload),
            _ => None,
        }
    }
}

/// Detections as reported by the service in JSON mode.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Detections {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageDimensions>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Prediction {
    /// Box centre.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub confidence: f64,
    pub class: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl Detections {
    /// Parses the pretty or raw JSON returned in JSON mode.
    pub fn from_json(text: &str) -> Result<Self, ClassifyError> {
        Ok(serde_json::from_str(text)?)
    }

    /// One line per detection, most confident first.
    pub fn summary(&self) -> String {
        if self.predictions.is_empty() {
            return "no waste detected".to_string();
        }
        let mut sorted: Vec<&Prediction> = self.predictions.iter().collect();
        sorted.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        sorted
            .iter()
            .map(|p| format!("{} ({:.0}%)", p.class, p.confidence * 100.0))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_follows_extension() {
        assert_eq!(media_type_for_path(Path::new("bottle.JPG")), "image/jpeg");
        assert_eq!(media_type_for_path(Path::new("can.png")), "image/png");
        assert_eq!(
            media_type_for_path(Path::new("notes.txt")),
            "application/octet-stream"
        );
        assert_eq!(media_type_for_path(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn blob_reports_size_in_megabytes() {
        let blob = ImageBlob::new("a.png", "image/png", vec![0; 1024 * 1024 * 3 / 2]);
        assert_eq!(blob.size_label(), "1.50 MB");
        assert_eq!(blob.size_bytes(), 1_572_864);
    }

    #[test]
    fn blob_data_url_has_prefix() {
        let blob = ImageBlob::new("a.png", "image/png", b"hi".to_vec());
        assert_eq!(blob.to_data_url(), "data:image/png;base64,aGk=");
    }

    #[test]
    fn only_image_types_are_images() {
        assert!(ImageBlob::new("a", "image/webp", vec![]).is_image());
        assert!(!ImageBlob::new("a", "text/plain", vec![]).is_image());
        assert!(!ImageBlob::new("a", "", vec![]).is_image());
    }

    #[test]
    fn apply_merges_and_clamps() {
        let mut params = InferenceParameters::default();
        params.apply(ParameterUpdate::default().confidence(250).format(OutputFormat::Json));
        assert_eq!(params.confidence_percent, 100);
        assert_eq!(params.overlap_percent, 50);
        assert_eq!(params.output_format, OutputFormat::Json);
        assert!(params.show_labels);
    }

    #[test]
    fn fractions_are_percent_over_hundred() {
        let params = InferenceParameters {
            confidence_percent: 7,
            overlap_percent: 100,
            ..Default::default()
        };
        assert_eq!(params.confidence(), 0.07);
        assert_eq!(params.overlap(), 1.0);
    }

    #[test]
    fn output_format_parses() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn detections_summary_orders_by_confidence() {
        let detections = Detections::from_json(
            r#"{"predictions":[
                {"x":1,"y":1,"width":2,"height":2,"confidence":0.41,"class":"paper"},
                {"x":5,"y":5,"width":2,"height":2,"confidence":0.93,"class":"plastic"}
            ],"image":{"width":640,"height":480}}"#,
        )
        .unwrap();
        assert_eq!(detections.summary(), "plastic (93%)\npaper (41%)");
        assert_eq!(detections.image.unwrap().width, 640);
    }

    #[test]
    fn empty_predictions_summary() {
        let detections = Detections::from_json(r#"{"predictions":[]}"#).unwrap();
        assert_eq!(detections.summary(), "no waste detected");
    }

    #[test]
    fn image_result_copies_data_url() {
        let payload = ResultPayload::Image(ImageHandle::new(vec![0xff, 0xd8]));
        assert_eq!(payload.clipboard_text(), "data:image/jpeg;base64,/9g=");
        assert_eq!(payload.kind(), OutputFormat::Image);
    }
}
