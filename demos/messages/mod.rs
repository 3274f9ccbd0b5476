use serde::{Deserialize, Serialize};
use wastelens::OutputFormat;

/// Query string accepted by the detection endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectQuery {
    #[serde(default)]
    pub api_key: String,
    pub confidence: f64,
    pub overlap: f64,
    pub format: OutputFormat,
    pub labels: Option<String>,
    pub image: Option<String>,
}
