use std::time::Instant;

use poisson_blend::{BoundaryMode, Image, Mask, Offset, PoissonBlender, SolverKind};

use crate::codec::{decode_image, decode_mask, encode_png};
use crate::error::{CodecError, ServiceError};
use crate::models::AppConfig;

/// One blend request: PNG-encoded inputs plus placement and overrides.
#[derive(Debug, Clone)]
pub struct BlendJob {
    pub source: Vec<u8>,
    pub target: Vec<u8>,
    pub mask: Vec<u8>,
    pub offset: Offset,
    /// Overrides the configured boundary mode
    pub boundary: Option<BoundaryMode>,
    /// Overrides the configured solver
    pub solver: Option<SolverKind>,
}

/// Runs blends with the configured defaults and size limits.
pub struct BlendService {
    blender: PoissonBlender,
    max_pixels: usize,
}

impl BlendService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            blender: config.blender(),
            max_pixels: config.server.max_pixels,
        }
    }

    pub fn with_blender(blender: PoissonBlender, max_pixels: usize) -> Self {
        Self {
            blender,
            max_pixels,
        }
    }

    pub fn blender(&self) -> &PoissonBlender {
        &self.blender
    }

    /// Blend a job and return the result as PNG bytes.
    ///
    /// Decoding, solving and encoding are CPU-bound, so the whole job runs
    /// on the blocking thread pool.
    pub async fn blend_png(&self, job: BlendJob) -> Result<Vec<u8>, ServiceError> {
        let blender = self.blender.clone();
        let max_pixels = self.max_pixels;

        tokio::task::spawn_blocking(move || run_job(&blender, max_pixels, &job))
            .await
            .map_err(|e| ServiceError::Task(e.to_string()))?
    }

    /// Synchronous variant of [`blend_png`](Self::blend_png) for callers
    /// outside the async runtime.
    pub fn blend_png_blocking(&self, job: &BlendJob) -> Result<Vec<u8>, ServiceError> {
        run_job(&self.blender, self.max_pixels, job)
    }

    /// Blend already-decoded buffers with the configured defaults.
    pub fn blend_images(
        &self,
        source: Image,
        target: Image,
        mask: &Mask,
        offset: Offset,
    ) -> Result<Image, ServiceError> {
        check_size("source", &source, self.max_pixels)?;
        check_size("target", &target, self.max_pixels)?;
        let (source, target) = match_channels(source, target);
        Ok(self.blender.blend(&source, &target, mask, offset)?)
    }
}

fn run_job(blender: &PoissonBlender, max_pixels: usize, job: &BlendJob) -> Result<Vec<u8>, ServiceError> {
    let started = Instant::now();

    let source = decode_image(&job.source, max_pixels).map_err(|e| named("source", e))?;
    let target = decode_image(&job.target, max_pixels).map_err(|e| named("target", e))?;
    let mask = decode_mask(&job.mask, max_pixels).map_err(|e| named("mask", e))?;

    let mut blender = blender.clone();
    if let Some(mode) = job.boundary {
        blender = blender.boundary(mode);
    }
    if let Some(kind) = job.solver {
        blender = blender.solver(kind);
    }

    let (source, target) = match_channels(source, target);
    let output = blender.blend(&source, &target, &mask, job.offset)?;
    let png = encode_png(&output)?;

    tracing::info!(
        width = output.width(),
        height = output.height(),
        channels = output.channels(),
        boundary = blender.boundary_mode().as_str(),
        solver = blender.solver_kind().as_str(),
        bytes = png.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Blend job finished"
    );
    Ok(png)
}

/// Attach the input's name to a size rejection from the decoder.
fn named(name: &'static str, error: CodecError) -> ServiceError {
    match error {
        CodecError::TooLarge { pixels, max } => ServiceError::TooLarge { name, pixels, max },
        other => other.into(),
    }
}

fn check_size(name: &'static str, image: &Image, max: usize) -> Result<(), ServiceError> {
    let pixels = image.len();
    if pixels > max {
        return Err(ServiceError::TooLarge { name, pixels, max });
    }
    Ok(())
}

/// Promote a grayscale input to RGB when the other input is RGB.
///
/// Files of the same scene are often saved with different color types; the
/// core requires equal channel counts.
fn match_channels(source: Image, target: Image) -> (Image, Image) {
    match (source.channels(), target.channels()) {
        (1, 3) => (gray_to_rgb(&source), target),
        (3, 1) => (source, gray_to_rgb(&target)),
        _ => (source, target),
    }
}

fn gray_to_rgb(image: &Image) -> Image {
    Image::from_fn(image.width(), image.height(), 3, |x, y| {
        vec![image.pixel(x, y)[0]; 3]
    })
}
