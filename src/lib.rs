//! Client side of an AI waste classifier.
//!
//! A [`SubmissionController`] collects one image (an uploaded file or a URL),
//! sends it to a hosted detection model with the user's parameters, and keeps
//! the annotated image or JSON detections that come back.

pub mod clipboard;
pub mod config;
pub mod error;
pub mod model;
pub mod notice;
pub mod render;
pub mod request;
pub mod transport;

pub use clipboard::{Clipboard, MemoryClipboard};
pub use config::ClassifierConfig;
pub use error::ClassifyError;
pub use model::{
    AnalysisState, Detections, ImageBlob, ImageHandle, InferenceParameters, InputSelection,
    OutputFormat, ParameterUpdate, ResultPayload,
};
pub use notice::{Notice, NoticeLevel};
pub use render::HttpReply;
pub use request::{InferenceRequest, RequestBody};
pub use transport::{HttpTransport, InferenceTransport};

#[cfg(feature = "clipboard")]
pub use clipboard::SystemClipboard;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Message shown for every failed analysis, whatever went wrong.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze the image. Please try again.";

/// What a call to [`SubmissionController::submit`] did.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// The service answered and the result is now displayed.
    Succeeded(ResultPayload),
    /// The analysis failed; carries the message shown to the user.
    Failed(String),
    /// Another analysis was already running, nothing was sent.
    Busy,
    /// No file or URL was selected, nothing was sent.
    NoInput,
}

struct ControllerState {
    selection: Option<InputSelection>,
    params: InferenceParameters,
    analysis: AnalysisState,
    notices: Vec<Notice>,
}

/// Owns the interactive state of the classification workflow.
///
/// All methods take `&self`; state sits behind a mutex that is never held
/// across an await point, so a second [`submit`](Self::submit) issued while
/// the first is still waiting on the network sees the `Running` state and
/// returns [`SubmitOutcome::Busy`].
pub struct SubmissionController<T: InferenceTransport> {
    config: ClassifierConfig,
    transport: T,
    state: Mutex<ControllerState>,
}

impl<T: InferenceTransport> SubmissionController<T> {
    /// Creates an idle controller with default parameters and no selection.
    pub fn new(config: ClassifierConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            state: Mutex::new(ControllerState {
                selection: None,
                params: InferenceParameters::default(),
                analysis: AnalysisState::Idle,
                notices: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The endpoint settings this controller was built with.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// The transport requests are sent through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a snapshot of the analysis state.
    pub fn state(&self) -> AnalysisState {
        self.lock().analysis.clone()
    }

    /// Returns the active file or URL, if any.
    pub fn selection(&self) -> Option<InputSelection> {
        self.lock().selection.clone()
    }

    /// Returns a copy of the current inference parameters.
    pub fn parameters(&self) -> InferenceParameters {
        self.lock().params.clone()
    }

    /// Whether a submit would actually send a request right now.
    pub fn can_submit(&self) -> bool {
        let state = self.lock();
        state.selection.is_some() && !state.analysis.is_running()
    }

    /// Makes `blob` the active input, replacing any URL and dropping any result.
    ///
    /// Non-image blobs are rejected and leave the state untouched.
    pub fn select_file(&self, blob: ImageBlob) -> Result<(), ClassifyError> {
        let mut state = self.lock();

        if !blob.is_image() {
            log::warn!("Rejected {} with media type {:?}", blob.name, blob.media_type);
            state.notices.push(Notice::invalid_file());
            return Err(ClassifyError::InvalidInput(format!(
                "{} is not an image ({})",
                blob.name, blob.media_type
            )));
        }

        log::debug!("Selected file {} ({})", blob.name, blob.size_label());
        state.notices.push(Notice::image_selected(&blob.name));
        state.selection = Some(InputSelection::File(blob));
        discard_result(&mut state.analysis);
        Ok(())
    }

    /// Makes `url` the active input, replacing any selected file and dropping any result.
    ///
    /// The URL is passed to the service as-is. Blank text is ignored.
    pub fn set_url(&self, url: &str) {
        if url.trim().is_empty() {
            log::debug!("Ignoring empty image URL");
            return;
        }

        let mut state = self.lock();
        log::debug!("Selected image URL {}", url);
        state.selection = Some(InputSelection::Url(url.to_string()));
        discard_result(&mut state.analysis);
    }

    /// Forgets the selected input and any result.
    pub fn clear_selection(&self) {
        let mut state = self.lock();
        state.selection = None;
        discard_result(&mut state.analysis);
    }

    /// Merges `update` into the current parameters.
    pub fn update_parameters(&self, update: ParameterUpdate) {
        self.lock().params.apply(update);
    }

    /// Flips label drawing for the next image request and returns the new value.
    ///
    /// An image already on screen keeps whatever labels it was rendered with.
    pub fn toggle_label_visibility(&self) -> bool {
        let mut state = self.lock();
        state.params.show_labels = !state.params.show_labels;
        state.params.show_labels
    }

    /// Sends the selected image for classification and waits for the answer.
    ///
    /// Exactly one request goes out per call. Calls made while another
    /// analysis is running, or with nothing selected, send nothing.
    pub async fn submit(&self) -> SubmitOutcome {
        let (selection, params) = {
            let mut state = self.lock();
            if state.analysis.is_running() {
                log::debug!("Analysis already running, ignoring submit");
                return SubmitOutcome::Busy;
            }
            let Some(selection) = state.selection.clone() else {
                state.notices.push(Notice::no_input());
                return SubmitOutcome::NoInput;
            };
            state.analysis = AnalysisState::Running;
            log::debug!("Analysis state: {}", state.analysis.as_str());
            (selection, state.params.clone())
        };
        let mut running = RunningGuard {
            state: &self.state,
            settled: false,
        };

        log::debug!(
            "Analyzing {} input, format {}",
            selection.kind(),
            params.output_format
        );

        let result = self.classify(&selection, &params).await;

        let mut state = self.lock();
        running.settled = true;
        let outcome = match result {
            Ok(payload) => {
                log::info!("Analysis complete, {} result", payload.kind());
                state.analysis = AnalysisState::Succeeded(payload.clone());
                state.notices.push(Notice::analysis_complete());
                SubmitOutcome::Succeeded(payload)
            }
            Err(err) => {
                if err.is_network_failure() {
                    log::error!("Inference service call failed: {}", err);
                } else {
                    log::error!("Error analyzing image: {}", err);
                }
                state.analysis = AnalysisState::Failed(ANALYSIS_FAILED_MESSAGE.to_string());
                state.notices.push(Notice::analysis_failed());
                SubmitOutcome::Failed(ANALYSIS_FAILED_MESSAGE.to_string())
            }
        };
        log::debug!("Analysis state: {}", state.analysis.as_str());
        outcome
    }

    async fn classify(
        &self,
        selection: &InputSelection,
        params: &InferenceParameters,
    ) -> Result<ResultPayload, ClassifyError> {
        let request = request::build_request(&self.config, params, selection)?;
        let reply = self.transport.send(request).await?;
        render::render_reply(params.output_format, reply)
    }

    /// Copies the current result to `clipboard`.
    ///
    /// Returns whether anything was written. Without a result nothing is
    /// written; clipboard failures are logged and otherwise ignored.
    pub fn copy_result(&self, clipboard: &mut impl Clipboard) -> bool {
        let mut state = self.lock();
        let Some(text) = state.analysis.result().map(ResultPayload::clipboard_text) else {
            return false;
        };

        match clipboard.write_text(&text) {
            Ok(()) => {
                state.notices.push(Notice::copied());
                true
            }
            Err(err) => {
                log::warn!("Could not copy result: {}", err);
                false
            }
        }
    }

    /// Takes the notices queued since the last call, oldest first.
    pub fn drain_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.lock().notices)
    }
}

/// Moves a submission abandoned mid-flight to `Failed` so the user can resubmit.
struct RunningGuard<'a> {
    state: &'a Mutex<ControllerState>,
    settled: bool,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.analysis.is_running() {
            log::warn!("Analysis dropped before the service answered");
            state.analysis = AnalysisState::Failed(ANALYSIS_FAILED_MESSAGE.to_string());
            state.notices.push(Notice::analysis_failed());
        }
    }
}

fn discard_result(analysis: &mut AnalysisState) {
    if !analysis.is_running() {
        *analysis = AnalysisState::Idle;
    }
}
