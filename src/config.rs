use crate::error::ClassifyError;
use reqwest::Url;
use std::time::Duration;

/// Hosted detection service used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://detect.roboflow.com/";
/// Waste classification model published on the hosted service.
pub const DEFAULT_MODEL: &str = "garbage-classification-3-i5yna";
pub const DEFAULT_VERSION: u32 = 6;

/// Endpoint settings handed to the controller when it is built.
///
/// The library never reads the environment on its own; binaries call
/// [`ClassifierConfig::from_env`] once at startup and pass the value down.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifierConfig {
    /// Service root, expected to end with a slash.
    pub base_url: String,
    pub model: String,
    pub version: u32,
    pub api_key: String,
    /// Upper bound for a single request. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            version: DEFAULT_VERSION,
            api_key: String::new(),
            timeout: None,
        }
    }
}

impl ClassifierConfig {
    /// Builds a configuration from `ROBOFLOW_*` environment variables.
    ///
    /// `ROBOFLOW_API_KEY` is read as-is; `ROBOFLOW_BASE_URL`, `ROBOFLOW_MODEL`,
    /// `ROBOFLOW_VERSION` and `ROBOFLOW_TIMEOUT_SECS` override the defaults
    /// when present.
    pub fn from_env() -> Result<Self, ClassifyError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClassifyError> {
        let mut config = Self::default();

        if let Some(key) = lookup("ROBOFLOW_API_KEY") {
            config.api_key = key;
        } else {
            log::warn!("ROBOFLOW_API_KEY is not set, requests will be rejected by the service");
        }
        if let Some(base_url) = lookup("ROBOFLOW_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Some(model) = lookup("ROBOFLOW_MODEL") {
            config.model = model;
        }
        if let Some(version) = lookup("ROBOFLOW_VERSION") {
            config.version = version.parse().map_err(|_| {
                ClassifyError::Config(format!("invalid ROBOFLOW_VERSION: {version}"))
            })?;
        }
        if let Some(secs) = lookup("ROBOFLOW_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                ClassifyError::Config(format!("invalid ROBOFLOW_TIMEOUT_SECS: {secs}"))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Sets the key appended as `api_key` to every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Sets the service root, appending the trailing slash if missing.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    /// Bounds each request to `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The model endpoint, `{base_url}{model}/{version}`, without a query.
    pub fn endpoint(&self) -> Result<Url, ClassifyError> {
        if self.model.is_empty() {
            return Err(ClassifyError::Config("model identifier is empty".to_string()));
        }
        let raw = format!("{}{}/{}", self.base_url, self.model, self.version);
        Url::parse(&raw).map_err(|e| ClassifyError::Config(format!("invalid endpoint {raw}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_endpoint_points_at_hosted_model() {
        let endpoint = ClassifierConfig::default().endpoint().unwrap();
        assert_eq!(
            endpoint.as_str(),
            "https://detect.roboflow.com/garbage-classification-3-i5yna/6"
        );
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let config = ClassifierConfig::default().with_base_url("http://127.0.0.1:9000");
        assert_eq!(config.base_url, "http://127.0.0.1:9000/");
        assert_eq!(
            config.endpoint().unwrap().as_str(),
            "http://127.0.0.1:9000/garbage-classification-3-i5yna/6"
        );
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = ClassifierConfig::from_lookup(lookup_from(&[
            ("ROBOFLOW_API_KEY", "secret"),
            ("ROBOFLOW_MODEL", "trash-net"),
            ("ROBOFLOW_VERSION", "2"),
            ("ROBOFLOW_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.model, "trash-net");
        assert_eq!(config.version, 2);
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn bad_version_is_a_config_error() {
        let err = ClassifierConfig::from_lookup(lookup_from(&[("ROBOFLOW_VERSION", "six")]))
            .unwrap_err();
        assert!(matches!(err, ClassifyError::Config(_)));
    }

    #[test]
    fn empty_model_is_rejected() {
        let mut config = ClassifierConfig::default();
        config.model.clear();
        assert!(matches!(config.endpoint(), Err(ClassifyError::Config(_))));
    }
}
