//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    payload::{parse_payload, RequestError},
    podcast_task::{generate_podcast_job, JobError},
    state::AppState,
};
use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Local;
use podcast_core::domain::{PodcastArtifact, PodcastRequest};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        generate_podcast_handler,
        health_handler,
    ),
    components(
        schemas(
            GeneratePodcastRequest,
            GeneratePodcastResponse,
            InvalidJsonResponse,
            ErrorResponse,
            BadRequestResponse,
            FailureResponse,
            ServerErrorResponse,
            RequestSummary,
            HealthResponse,
        )
    ),
    tags(
        (name = "Podcast Generation API", description = "Turns written reports into published podcast episodes.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The JSON body accepted by `POST /generate-podcast`.
///
/// Documentation only: bodies are parsed by `web::payload`.
#[derive(ToSchema)]
pub struct GeneratePodcastRequest {
    /// Identifier of the show, as a string or a number. `podcastId` is accepted as well.
    #[schema(value_type = Option<Value>, example = "pod-42")]
    pub podcast_id: Option<String>,
    /// The topic of the episode.
    pub prompt: String,
    /// The report the hosts discuss. Markdown is stripped.
    pub report_text: String,
    /// Defaults to "Weekly Podcast on {prompt}" when absent or blank.
    pub podcast_name: Option<String>,
}

/// The response payload sent after an episode has been published.
#[derive(Serialize, ToSchema)]
pub struct GeneratePodcastResponse {
    podcast_id: String,
    #[serde(rename = "podcastUrl")]
    podcast_url: String,
    audio_filename: String,
    text_file: String,
}

impl From<PodcastArtifact> for GeneratePodcastResponse {
    fn from(artifact: PodcastArtifact) -> Self {
        Self {
            podcast_id: artifact.podcast_id,
            podcast_url: artifact.public_url,
            audio_filename: artifact.audio_filename,
            text_file: artifact.text_file.display().to_string(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct InvalidJsonResponse {
    error: String,
    details: String,
    raw_data_sample: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    error: String,
}

/// Either malformed JSON or missing required fields.
#[derive(Serialize, ToSchema)]
#[serde(untagged)]
pub enum BadRequestResponse {
    InvalidJson(InvalidJsonResponse),
    MissingFields(ErrorResponse),
}

/// Either a generator that produced no audio, or any other pipeline failure.
#[derive(Serialize, ToSchema)]
#[serde(untagged)]
pub enum ServerErrorResponse {
    GenerationFailed(ErrorResponse),
    Failure(FailureResponse),
}

/// Diagnostic payload returned when the pipeline fails unexpectedly.
#[derive(Serialize, ToSchema)]
pub struct FailureResponse {
    error: String,
    error_type: String,
    timestamp: String,
    request_data: RequestSummary,
}

/// The validated request as it reached the pipeline.
///
/// `report_text_length` counts characters of the cleaned and trimmed report,
/// the text that was actually sent for generation.
#[derive(Serialize, ToSchema)]
pub struct RequestSummary {
    podcast_id: String,
    podcast_name: String,
    prompt: String,
    report_text_length: usize,
}

impl From<&PodcastRequest> for RequestSummary {
    fn from(request: &PodcastRequest) -> Self {
        Self {
            podcast_id: request.podcast_id.clone(),
            podcast_name: request.podcast_name.clone(),
            prompt: request.topic.clone(),
            report_text_length: request.report_text.chars().count(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
}

fn request_error_response(err: RequestError) -> Response {
    let body = match err {
        RequestError::InvalidJson {
            details,
            raw_data_sample,
        } => BadRequestResponse::InvalidJson(InvalidJsonResponse {
            error: "Invalid JSON format".to_string(),
            details,
            raw_data_sample,
        }),
        missing @ RequestError::MissingFields(_) => {
            BadRequestResponse::MissingFields(ErrorResponse {
                error: missing.to_string(),
            })
        }
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn job_error_response(err: JobError, request: &PodcastRequest) -> Response {
    let body = match err {
        JobError::GenerationFailed => ServerErrorResponse::GenerationFailed(ErrorResponse {
            error: err.to_string(),
        }),
        _ => ServerErrorResponse::Failure(FailureResponse {
            error: err.to_string(),
            error_type: err.kind().to_string(),
            timestamp: Local::now()
                .naive_local()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
            request_data: RequestSummary::from(request),
        }),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Generate a podcast episode from a report and publish it.
///
/// The body is read as raw bytes so that clients sending an unexpected
/// `Content-Type` are still served.
#[utoipa::path(
    post,
    path = "/generate-podcast",
    request_body(content = GeneratePodcastRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Episode generated and uploaded", body = GeneratePodcastResponse),
        (status = 400, description = "Malformed JSON or missing required fields", body = BadRequestResponse),
        (status = 500, description = "Generation or upload failed", body = ServerErrorResponse)
    )
)]
pub async fn generate_podcast_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("None");
    info!("Received request with Content-Type: {}", content_type);

    let parsed = match parse_payload(&body) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!("Rejected podcast request: {}", e);
            return request_error_response(e);
        }
    };
    let request = parsed.request;
    info!("Successfully parsed JSON data with keys: {:?}", parsed.keys);
    info!(
        podcast_id = %request.podcast_id,
        podcast_name = %request.podcast_name,
        prompt = %request.topic,
        report_text_chars = request.report_text.chars().count(),
        "Processing podcast request"
    );

    match generate_podcast_job(&app_state, &request).await {
        Ok(artifact) => Json(GeneratePodcastResponse::from(artifact)).into_response(),
        Err(e) => {
            error!(error_type = e.kind(), "Podcast generation failed: {:?}", e);
            job_error_response(e, &request)
        }
    }
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
