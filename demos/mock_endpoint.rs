use argh::FromArgs;
use axum::{
    Json, Router,
    extract::{Path, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::{Engine, prelude::BASE64_STANDARD};
use serde_json::json;
use wastelens::{
    OutputFormat,
    model::{Detections, ImageDimensions, Prediction},
};

mod messages;

// defaults for the server
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

#[derive(FromArgs)]
/// A local stand-in for the hosted detection endpoint.
struct MockArgs {
    /// the host to run the server on
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to run the server on
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn canned_detections(confidence: f64) -> Detections {
    let predictions = [
        ("plastic", 0.91, 220.0, 180.0),
        ("cardboard", 0.64, 410.0, 300.0),
        ("metal", 0.38, 90.0, 350.0),
    ]
    .into_iter()
    .filter(|(_, score, _, _)| *score >= confidence)
    .map(|(class, score, x, y)| Prediction {
        x,
        y,
        width: 120.0,
        height: 90.0,
        confidence: score,
        class: class.to_string(),
    })
    .collect();

    Detections {
        predictions,
        image: Some(ImageDimensions {
            width: 640,
            height: 480,
        }),
    }
}

async fn post_detect(
    Path((model, version)): Path<(String, u32)>,
    Query(query): Query<messages::DetectQuery>,
    body: String,
) -> Response {
    log::debug!("Detect request for {}/{}", model, version);

    if query.api_key.is_empty() {
        return error(StatusCode::FORBIDDEN, "missing api_key");
    }

    let upload = body.trim();
    if upload.is_empty() && query.image.is_none() {
        return error(StatusCode::BAD_REQUEST, "no image provided");
    }

    match query.format {
        OutputFormat::Json => {
            log::info!("Returning detections above {}", query.confidence);
            Json(canned_detections(query.confidence)).into_response()
        }
        OutputFormat::Image => {
            if upload.is_empty() {
                return error(StatusCode::BAD_REQUEST, "remote images are not fetched");
            }
            match BASE64_STANDARD.decode(upload) {
                Ok(bytes) => {
                    log::info!("Echoing {} byte image, labels {:?}", bytes.len(), query.labels);
                    ([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response()
                }
                Err(e) => error(StatusCode::BAD_REQUEST, &e.to_string()),
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: MockArgs = argh::from_env();

    // format the host and port
    let addr = format!("{}:{}", args.host, args.port);

    let app = Router::new()
        .route("/", get(|| async { "Mock waste detection endpoint" }))
        .route("/{model}/{version}", post(post_detect));

    log::info!("🚀 Starting the mock endpoint");
    log::info!("🔥 Listening on: {}", addr);
    log::info!("🔧 Press Ctrl+C to stop the server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
