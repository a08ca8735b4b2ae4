use crate::error::ConfigError;
use crate::palette::{PaletteOptions, QuantizeOptions};
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = ".character-checker";

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Workspace directory - computed from home, not serialized
    #[serde(skip)]
    pub workspace_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub vision: VisionConfig,

    #[serde(default)]
    pub palette: PaletteConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub uploads: UploadsConfig,

    #[serde(default)]
    pub limits: LimitsConfig,
}

// ── Vision model ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Gemini API key (`GEMINI_API_KEY` / `GOOGLE_API_KEY` override it)
    #[serde(default)]
    pub api_key: Option<String>,
    /// API root, without the `/v1beta` suffix
    #[serde(default = "default_vision_base_url")]
    pub base_url: String,
    /// Model identifiers tried in order; the first that answers wins
    #[serde(default = "default_vision_models")]
    pub models: Vec<String>,
    #[serde(default = "default_vision_temperature")]
    pub temperature: f64,
    /// HTTP client timeout per model attempt
    #[serde(default = "default_vision_timeout_secs")]
    pub timeout_secs: u64,
    /// Budget for the whole model chain; must stay under the gateway timeout
    #[serde(default = "default_vision_total_timeout_secs")]
    pub total_timeout_secs: u64,
}

fn default_vision_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}

fn default_vision_models() -> Vec<String> {
    vec![
        "gemini-2.0-flash-exp".into(),
        "gemini-2.0-flash".into(),
        "gemini-1.5-flash".into(),
    ]
}

fn default_vision_temperature() -> f64 {
    0.4
}

fn default_vision_timeout_secs() -> u64 {
    120
}

fn default_vision_total_timeout_secs() -> u64 {
    300
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_vision_base_url(),
            models: default_vision_models(),
            temperature: default_vision_temperature(),
            timeout_secs: default_vision_timeout_secs(),
            total_timeout_secs: default_vision_total_timeout_secs(),
        }
    }
}

// ── Palette extraction ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteConfig {
    /// Colors per palette (default: 5)
    #[serde(default = "default_n_colors")]
    pub n_colors: usize,
    /// Every image is resized to this grid before clustering
    #[serde(default = "default_resize_side")]
    pub resize_width: u32,
    #[serde(default = "default_resize_side")]
    pub resize_height: u32,
    /// k-means seed; keep fixed for reproducible palettes
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Uploads larger than this on their longest side are downscaled
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

fn default_n_colors() -> usize {
    crate::palette::DEFAULT_COLORS
}

fn default_resize_side() -> u32 {
    100
}

fn default_max_iterations() -> usize {
    crate::palette::quantize::DEFAULT_MAX_ITERATIONS
}

fn default_tolerance() -> f64 {
    crate::palette::quantize::DEFAULT_TOLERANCE
}

fn default_max_dimension() -> u32 {
    2048
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            n_colors: default_n_colors(),
            resize_width: default_resize_side(),
            resize_height: default_resize_side(),
            seed: 0,
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            max_dimension: default_max_dimension(),
        }
    }
}

impl PaletteConfig {
    #[must_use]
    pub fn options(&self) -> PaletteOptions {
        PaletteOptions {
            n_colors: self.n_colors,
            resize: (self.resize_width, self.resize_height),
            quantize: QuantizeOptions {
                seed: self.seed,
                max_iterations: self.max_iterations,
                tolerance: self.tolerance,
            },
        }
    }
}

// ── Gateway ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway port (default: 8000)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Origins allowed by CORS (credentials are allowed for these)
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Upper bound for a whole multipart request
    #[serde(default = "default_max_body_mb")]
    pub max_body_mb: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_gateway_port() -> u16 {
    8000
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "https://character-checker.vercel.app".into(),
        "http://localhost:3000".into(),
    ]
}

fn default_max_body_mb() -> usize {
    50
}

fn default_request_timeout_secs() -> u64 {
    420
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            host: default_gateway_host(),
            allowed_origins: default_allowed_origins(),
            max_body_mb: default_max_body_mb(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl GatewayConfig {
    #[must_use]
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_mb.saturating_mul(1024 * 1024)
    }
}

// ── Upload artifacts ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    /// Artifact directory (default: `<workspace>/uploads`)
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Write normalized uploads (or raw bytes when decoding fails) to disk
    #[serde(default = "default_true")]
    pub persist: bool,
}

fn default_true() -> bool {
    true
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: None,
            persist: true,
        }
    }
}

// ── Request limits ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_min_images")]
    pub min_images: usize,
    #[serde(default = "default_max_images")]
    pub max_images: usize,
}

fn default_min_images() -> usize {
    2
}

fn default_max_images() -> usize {
    5
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_images: default_min_images(),
            max_images: default_max_images(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        let checker_dir = home.join(CONFIG_DIR_NAME);

        Self {
            workspace_dir: checker_dir.join("workspace"),
            config_path: checker_dir.join("config.toml"),
            vision: VisionConfig::default(),
            palette: PaletteConfig::default(),
            gateway: GatewayConfig::default(),
            uploads: UploadsConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let checker_dir = home.join(CONFIG_DIR_NAME);
        let config_path = checker_dir.join("config.toml");

        if !checker_dir.exists() {
            fs::create_dir_all(&checker_dir)
                .context("Failed to create .character-checker directory")?;
            fs::create_dir_all(checker_dir.join("workspace"))
                .context("Failed to create workspace directory")?;
        }

        if config_path.exists() {
            let mut config = Self::load_from(&config_path)?;
            config.workspace_dir = checker_dir.join("workspace");
            Ok(config)
        } else {
            let config = Self {
                config_path: config_path.clone(),
                workspace_dir: checker_dir.join("workspace"),
                ..Self::default()
            };
            config.validate()?;
            config.save()?;
            Ok(config)
        }
    }

    /// Load an explicit config file. The workspace sits next to it.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(ConfigError::Io)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(e.to_string()))
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.config_path = path.to_path_buf();
        config.workspace_dir = path
            .parent()
            .map_or_else(|| PathBuf::from("workspace"), |dir| dir.join("workspace"));
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to config
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = non_empty_env("GEMINI_API_KEY").or_else(|| non_empty_env("GOOGLE_API_KEY"))
        {
            self.vision.api_key = Some(key);
        }

        if let Some(models) = non_empty_env("CHARACTER_CHECKER_MODELS") {
            let models: Vec<String> = models
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(ToOwned::to_owned)
                .collect();
            if !models.is_empty() {
                self.vision.models = models;
            }
        }

        if let Some(host) = non_empty_env("CHARACTER_CHECKER_HOST") {
            self.gateway.host = host;
        }

        if let Some(port_str) =
            non_empty_env("CHARACTER_CHECKER_PORT").or_else(|| non_empty_env("PORT"))
        {
            if let Ok(port) = port_str.parse::<u16>() {
                self.gateway.port = port;
            } else {
                tracing::warn!(value = port_str.as_str(), "Ignoring unparsable port override");
            }
        }

        if let Some(dir) = non_empty_env("CHARACTER_CHECKER_UPLOAD_DIR") {
            self.uploads.dir = Some(PathBuf::from(dir));
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.palette.n_colors == 0 {
            return Err(ConfigError::Validation("palette.n_colors must be at least 1".into()));
        }
        if self.palette.resize_width == 0 || self.palette.resize_height == 0 {
            return Err(ConfigError::Validation(
                "palette.resize_width and palette.resize_height must be non-zero".into(),
            ));
        }
        let grid = u64::from(self.palette.resize_width) * u64::from(self.palette.resize_height);
        if (self.palette.n_colors as u64) > grid {
            return Err(ConfigError::Validation(format!(
                "palette.n_colors ({}) exceeds the {grid} pixels of the resize grid",
                self.palette.n_colors
            )));
        }
        if self.palette.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "palette.max_dimension must be non-zero".into(),
            ));
        }
        if self.vision.models.iter().all(|m| m.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "vision.models must name at least one model".into(),
            ));
        }
        if self.vision.total_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "vision.total_timeout_secs must be non-zero".into(),
            ));
        }
        if self.vision.total_timeout_secs >= self.gateway.request_timeout_secs {
            return Err(ConfigError::Validation(format!(
                "vision.total_timeout_secs ({}) must be below gateway.request_timeout_secs ({})",
                self.vision.total_timeout_secs, self.gateway.request_timeout_secs
            )));
        }
        if self.limits.min_images == 0 || self.limits.min_images > self.limits.max_images {
            return Err(ConfigError::Validation(format!(
                "limits.min_images ({}) must be between 1 and limits.max_images ({})",
                self.limits.min_images, self.limits.max_images
            )));
        }
        Ok(())
    }

    /// Directory that receives per-request upload artifacts.
    #[must_use]
    pub fn upload_dir(&self) -> PathBuf {
        self.uploads
            .dir
            .clone()
            .unwrap_or_else(|| self.workspace_dir.join("uploads"))
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
