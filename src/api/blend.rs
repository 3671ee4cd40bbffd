use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use poisson_blend::{BoundaryMode, Offset, SolverKind};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::services::{BlendJob, BlendService};

/// Request body for a blend
#[derive(Debug, Deserialize, ToSchema)]
pub struct BlendRequest {
    /// Source image, base64-encoded PNG (a `data:` URI prefix is accepted)
    pub source: String,
    /// Target image, base64-encoded PNG
    pub target: String,
    /// Mask on the target canvas, base64-encoded PNG; nonzero pixels are
    /// inside the blend region
    pub mask: String,
    /// Displacement of the source in pixels
    #[serde(default)]
    pub offset: OffsetParams,
    /// "pinned" (default) or "interior"
    #[serde(default)]
    pub boundary: Option<String>,
    /// "cholesky" (default) or "lu"
    #[serde(default)]
    pub solver: Option<String>,
}

/// Source displacement, positive `dx` to the right, positive `dy` down
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, ToSchema)]
pub struct OffsetParams {
    #[serde(default)]
    pub dx: i32,
    #[serde(default)]
    pub dy: i32,
}

/// Error body returned for every failed request
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status code
    pub status: u16,
    /// Human-readable error message
    pub error: String,
}

/// Blend a source region into a target image
///
/// The source is shifted by `offset`; inside the mask the result keeps the
/// source's gradients, outside it reproduces the target. Returns the result
/// as `image/png`.
#[utoipa::path(
    post,
    path = "/api/blend",
    request_body = BlendRequest,
    responses(
        (status = 200, description = "Blended image (image/png)"),
        (status = 400, description = "Malformed request or undecodable image", body = ErrorResponse),
        (status = 413, description = "Image or request body too large", body = ErrorResponse),
        (status = 422, description = "Inputs violate blend preconditions", body = ErrorResponse),
        (status = 500, description = "Solver failure", body = ErrorResponse),
    ),
    tag = "Blending"
)]
pub async fn handle_blend(
    State(service): State<Arc<BlendService>>,
    Json(request): Json<BlendRequest>,
) -> Result<Response, ApiError> {
    let job = BlendJob {
        source: decode_base64("source", &request.source)?,
        target: decode_base64("target", &request.target)?,
        mask: decode_base64("mask", &request.mask)?,
        offset: Offset::new(request.offset.dx, request.offset.dy),
        boundary: parse_option("boundary", request.boundary.as_deref(), BoundaryMode::parse)?,
        solver: parse_option("solver", request.solver.as_deref(), SolverKind::parse)?,
    };

    tracing::debug!(
        source_bytes = job.source.len(),
        target_bytes = job.target.len(),
        mask_bytes = job.mask.len(),
        dx = job.offset.dx,
        dy = job.offset.dy,
        "Blend request"
    );

    let png = service.blend_png(job).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// Decode a base64 payload, tolerating a `data:image/png;base64,` prefix
/// and surrounding whitespace.
fn decode_base64(field: &str, value: &str) -> Result<Vec<u8>, ApiError> {
    let trimmed = value.trim();
    let payload = match trimmed.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => trimmed,
    };
    STANDARD
        .decode(payload)
        .map_err(|e| ApiError::BadRequest(format!("{field} is not valid base64: {e}")))
}

fn parse_option<T>(
    field: &str,
    value: Option<&str>,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, ApiError> {
    match value {
        None => Ok(None),
        Some(name) => parse(name)
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown {field}: {name}"))),
    }
}
