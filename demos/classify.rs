use argh::FromArgs;
use std::path::PathBuf;
use wastelens::{
    ClassifierConfig, Detections, HttpTransport, ImageBlob, OutputFormat, ParameterUpdate,
    ResultPayload, SubmissionController, SubmitOutcome,
};

// defaults for the classifier
const DEFAULT_CONFIDENCE: u8 = 50;
const DEFAULT_OVERLAP: u8 = 50;
const DEFAULT_OUTPUT: &str = "classified.jpg";

#[derive(FromArgs)]
/// Classify waste in an image with a hosted detection model.
struct ClassifyArgs {
    /// the image file to upload
    #[argh(option, short = 'f')]
    file: Option<PathBuf>,

    /// a public image URL, used when no file is given
    #[argh(option, short = 'u')]
    url: Option<String>,

    /// minimum confidence in percent
    #[argh(option, short = 'c', default = "DEFAULT_CONFIDENCE")]
    confidence: u8,

    /// maximum box overlap in percent
    #[argh(option, default = "DEFAULT_OVERLAP")]
    overlap: u8,

    /// output format: "image" or "json"
    #[argh(option, default = "OutputFormat::Image")]
    format: OutputFormat,

    /// do not draw labels on the annotated image
    #[argh(switch)]
    no_labels: bool,

    /// where to save the annotated image
    #[argh(option, short = 'o', default = "PathBuf::from(DEFAULT_OUTPUT)")]
    output: PathBuf,

    /// copy the result to the clipboard
    #[argh(switch)]
    copy: bool,

    /// service root, e.g. http://localhost:3000/ for the mock endpoint
    #[argh(option)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: ClassifyArgs = argh::from_env();

    let mut config = ClassifierConfig::from_env()?;
    if let Some(base_url) = args.base_url {
        config = config.with_base_url(base_url);
    }

    let transport = HttpTransport::new(&config)?;
    let controller = SubmissionController::new(config, transport);

    controller.update_parameters(
        ParameterUpdate::default()
            .confidence(args.confidence)
            .overlap(args.overlap)
            .format(args.format)
            .labels(!args.no_labels),
    );

    // the file wins when both are given
    if let Some(url) = &args.url {
        controller.set_url(url);
    }
    if let Some(path) = &args.file {
        let blob = ImageBlob::from_path(path)?;
        println!("{} ({})", blob.name, blob.size_label());
        controller.select_file(blob)?;
    }

    let outcome = controller.submit().await;

    if args.copy {
        copy_to_clipboard(&controller);
    }

    for notice in controller.drain_notices() {
        if notice.is_error() {
            log::error!("{}", notice);
        } else {
            log::info!("{}", notice);
        }
    }

    match outcome {
        SubmitOutcome::Succeeded(ResultPayload::Image(handle)) => {
            handle.save(&args.output)?;
            println!("Annotated image saved to {}", args.output.display());
        }
        SubmitOutcome::Succeeded(ResultPayload::Json(text)) => {
            println!("{}", text);
            if let Ok(detections) = Detections::from_json(&text) {
                println!("\n{}", detections.summary());
            }
        }
        SubmitOutcome::Failed(message) => return Err(message.into()),
        SubmitOutcome::NoInput => return Err("pass --file or --url".into()),
        SubmitOutcome::Busy => return Err("another analysis is already running".into()),
    }

    Ok(())
}

#[cfg(feature = "clipboard")]
fn copy_to_clipboard(controller: &SubmissionController<HttpTransport>) {
    match wastelens::SystemClipboard::new() {
        Ok(mut clipboard) => {
            controller.copy_result(&mut clipboard);
        }
        Err(e) => log::warn!("{}", e),
    }
}

#[cfg(not(feature = "clipboard"))]
fn copy_to_clipboard(_controller: &SubmissionController<HttpTransport>) {
    log::warn!("Built without the `clipboard` feature, nothing copied");
}
