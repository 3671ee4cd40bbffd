use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use poisson_blend::{BoundaryMode, Offset, PoissonBlender, SolverKind};
use seamless::api;
use seamless::codec::{decode_image, encode_mask, encode_png};
use seamless::models::AppConfig;
use seamless::server;
use seamless::services::{BlendJob, BlendService};
use seamless::session::{EditSession, SessionEvent};

#[derive(Parser)]
#[command(name = "seamless")]
#[command(about = "Seamless - gradient-domain image blending")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Blend a source region into a target image
    Blend {
        /// Source PNG
        #[arg(short, long)]
        source: PathBuf,

        /// Target PNG
        #[arg(short, long)]
        target: PathBuf,

        /// Mask PNG on the target canvas (nonzero = inside)
        #[arg(short, long)]
        mask: PathBuf,

        /// Horizontal source displacement in pixels
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        dx: i32,

        /// Vertical source displacement in pixels
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        dy: i32,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// Boundary mode: "pinned" or "interior"
        #[arg(long)]
        boundary: Option<String>,

        /// Solver backend: "cholesky" or "lu"
        #[arg(long)]
        solver: Option<String>,

        /// Solve color channels one after another
        #[arg(long)]
        sequential: bool,
    },
    /// Replay a recorded editing session, then blend
    Session {
        /// Source PNG (polygon vertices are in its coordinates)
        #[arg(short, long)]
        source: PathBuf,

        /// Target PNG
        #[arg(short, long)]
        target: PathBuf,

        /// JSON file with an array of session events
        #[arg(short, long)]
        events: PathBuf,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// Also write the final mask as PNG
        #[arg(long)]
        mask_output: Option<PathBuf>,
    },
    /// Start the HTTP server
    Serve,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Seamless API",
        description = "Gradient-domain (Poisson) image blending",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(api::handle_blend),
    components(schemas(api::BlendRequest, api::OffsetParams, api::ErrorResponse)),
    tags(
        (name = "Blending", description = "Seamless image compositing")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Blend {
            source,
            target,
            mask,
            dx,
            dy,
            output,
            boundary,
            solver,
            sequential,
        }) => {
            init_cli_logging();
            let blender = cli_blender(boundary.as_deref(), solver.as_deref(), sequential)?;
            run_blend_command(blender, &source, &target, &mask, Offset::new(dx, dy), &output)
        }
        Some(Commands::Session {
            source,
            target,
            events,
            output,
            mask_output,
        }) => {
            init_cli_logging();
            run_session_command(&source, &target, &events, &output, mask_output.as_deref())
        }
        Some(Commands::Serve) => run_server().await,
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Minimal logging for CLI
fn init_cli_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

/// Configured blender with command-line overrides applied
fn cli_blender(
    boundary: Option<&str>,
    solver: Option<&str>,
    sequential: bool,
) -> anyhow::Result<PoissonBlender> {
    let mut blender = AppConfig::from_env().blender();
    if let Some(name) = boundary {
        let mode = BoundaryMode::parse(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown boundary mode: {name}"))?;
        blender = blender.boundary(mode);
    }
    if let Some(name) = solver {
        let kind =
            SolverKind::parse(name).ok_or_else(|| anyhow::anyhow!("Unknown solver: {name}"))?;
        blender = blender.solver(kind);
    }
    if sequential {
        blender = blender.parallel(false);
    }
    Ok(blender)
}

fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))
}

/// Blend three PNG files into an output PNG (no server needed)
fn run_blend_command(
    blender: PoissonBlender,
    source: &Path,
    target: &Path,
    mask: &Path,
    offset: Offset,
    output: &Path,
) -> anyhow::Result<()> {
    let job = BlendJob {
        source: read_file(source)?,
        target: read_file(target)?,
        mask: read_file(mask)?,
        offset,
        boundary: None,
        solver: None,
    };

    let service = BlendService::with_blender(blender, usize::MAX);
    let png_bytes = service.blend_png_blocking(&job)?;

    std::fs::write(output, &png_bytes)?;
    println!("Blended {} ({} bytes)", output.display(), png_bytes.len());
    Ok(())
}

/// Replay a JSON event script through an editing session, then blend
fn run_session_command(
    source: &Path,
    target: &Path,
    events: &Path,
    output: &Path,
    mask_output: Option<&Path>,
) -> anyhow::Result<()> {
    let source = decode_image(&read_file(source)?, usize::MAX)?;
    let target = decode_image(&read_file(target)?, usize::MAX)?;
    let script: Vec<SessionEvent> = serde_json::from_slice(&read_file(events)?)
        .map_err(|e| anyhow::anyhow!("Invalid event script {}: {e}", events.display()))?;

    let mut session = EditSession::new(target.width(), target.height());
    for (index, event) in script.iter().enumerate() {
        session
            .apply(*event)
            .map_err(|e| anyhow::anyhow!("Event {index}: {e}"))?;
    }
    let outcome = session.finish()?;

    if let Some(path) = mask_output {
        std::fs::write(path, encode_mask(&outcome.mask)?)?;
        println!("Wrote mask {}", path.display());
    }

    let service = BlendService::with_blender(AppConfig::from_env().blender(), usize::MAX);
    let blended = service.blend_images(source, target, &outcome.mask, outcome.offset)?;
    let png_bytes = encode_png(&blended)?;

    std::fs::write(output, &png_bytes)?;
    println!(
        "Blended {} ({} bytes, offset {},{})",
        output.display(),
        png_bytes.len(),
        outcome.offset.dx,
        outcome.offset.dy
    );
    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    // Read environment variables
    let bind_addr = std::env::var("BIND_ADDR").ok();
    let config_file = std::env::var("CONFIG_FILE").ok();
    let rust_log = std::env::var("RUST_LOG").ok();

    // Header
    println!("Seamless v{VERSION}");
    println!("Gradient-domain image blending\n");

    // Environment variables section
    println!("Environment Variables:");
    println!(
        "  BIND_ADDR   = {}",
        bind_addr.as_deref().unwrap_or("0.0.0.0:3000 (default)")
    );
    println!(
        "  CONFIG_FILE = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  RUST_LOG    = {}",
        rust_log.as_deref().unwrap_or("(not set)")
    );

    // Configuration section
    let config_source = match config_file {
        Some(ref path) if Path::new(path).exists() => path.to_string(),
        Some(_) => "defaults (file not found)".to_string(),
        None => "defaults".to_string(),
    };
    let config = match config_file {
        Some(ref path) if Path::new(path).exists() => AppConfig::load(Path::new(path)),
        _ => AppConfig::default(),
    };
    println!("\nConfiguration: {config_source}");
    println!("  boundary   = {}", config.boundary_mode().as_str());
    println!("  solver     = {}", config.solver_kind().as_str());
    println!("  parallel   = {}", config.blend.parallel);
    println!("  max_pixels = {}", config.server.max_pixels);

    // Commands section
    println!("\nCommands:");
    println!("  seamless blend     Blend a source region into a target image");
    println!("  seamless session   Replay an editing session, then blend");
    println!("  seamless serve     Start the HTTP server");
    println!("\nRun 'seamless --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seamless=info,poisson_blend=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let config = AppConfig::from_env();

    let state = server::create_app_state(config);

    // Build router: shared API routes plus OpenAPI documentation
    let app = server::build_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Seamless server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
