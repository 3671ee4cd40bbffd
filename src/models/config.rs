use poisson_blend::{BoundaryMode, PoissonBlender, SolverKind};
use serde::Deserialize;
use std::path::Path;

/// Application configuration loaded from a YAML file
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Blending defaults
    #[serde(default)]
    pub blend: BlendConfig,

    /// HTTP server limits
    #[serde(default)]
    pub server: ServerConfig,
}

/// Defaults applied to every blend unless a request overrides them
#[derive(Debug, Deserialize, Clone)]
pub struct BlendConfig {
    /// "pinned" or "interior"
    #[serde(default = "default_boundary")]
    pub boundary: String,

    /// "cholesky" or "lu"
    #[serde(default = "default_solver")]
    pub solver: String,

    /// Solve color channels in parallel
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_boundary() -> String {
    BoundaryMode::default().as_str().to_string()
}

fn default_solver() -> String {
    SolverKind::default().as_str().to_string()
}

fn default_parallel() -> bool {
    true
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            boundary: default_boundary(),
            solver: default_solver(),
            parallel: default_parallel(),
        }
    }
}

/// Limits for the HTTP service
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Largest accepted source or target canvas, in pixels
    #[serde(default = "default_max_pixels")]
    pub max_pixels: usize,

    /// Largest accepted request body, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_max_pixels() -> usize {
    4_000_000 // e.g. 2000x2000
}

fn default_max_body_bytes() -> usize {
    64 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_pixels: default_max_pixels(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the file named by `CONFIG_FILE`, if any
    pub fn from_env() -> Self {
        match std::env::var("CONFIG_FILE") {
            Ok(path) => Self::load(Path::new(&path)),
            Err(_) => {
                tracing::debug!("CONFIG_FILE not set, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from a YAML file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::parse(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        boundary = %config.blend.boundary,
                        solver = %config.blend.solver,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    pub fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Configured boundary mode; unknown names fall back to the default
    pub fn boundary_mode(&self) -> BoundaryMode {
        BoundaryMode::parse(&self.blend.boundary).unwrap_or_else(|| {
            tracing::warn!(boundary = %self.blend.boundary, "Unknown boundary mode, using default");
            BoundaryMode::default()
        })
    }

    /// Configured solver backend; unknown names fall back to the default
    pub fn solver_kind(&self) -> SolverKind {
        SolverKind::parse(&self.blend.solver).unwrap_or_else(|| {
            tracing::warn!(solver = %self.blend.solver, "Unknown solver, using default");
            SolverKind::default()
        })
    }

    /// A blender with the configured defaults
    pub fn blender(&self) -> PoissonBlender {
        PoissonBlender::new()
            .boundary(self.boundary_mode())
            .solver(self.solver_kind())
            .parallel(self.blend.parallel)
    }
}
