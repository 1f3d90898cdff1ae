//! Error types shared by the host-side modules and the browser runtime.

/// Result alias for preset setup and session operations.
pub type Result<T> = std::result::Result<T, PresetError>;

/// Failure to parse a `#RRGGBB` colour string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("colour {0:?} must be 7 characters long (#RRGGBB)")]
    Length(String),

    #[error("colour {0:?} must start with '#'")]
    MissingHash(String),

    #[error("colour {0:?} contains non-hexadecimal digits")]
    InvalidHex(String),
}

/// Problems with a visualizer-variables object.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A field without a fallback value was absent or null.
    #[error("missing required field `{0}`")]
    Missing(&'static str),

    #[error("bar_count must be at least 1, got {0}")]
    InvalidBarCount(u32),

    #[error("invalid colour in `{field}`: {source}")]
    Color {
        field: &'static str,
        #[source]
        source: ColorError,
    },

    #[error("malformed variables: {0}")]
    Json(#[from] serde_json::Error),
}

/// Shader stage, used to label compile failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Every way starting, running or replacing a preset can fail.
///
/// Browser exceptions arrive as `JsValue`; they are flattened to their
/// debug representation so the enum stays `Send` and host-testable.
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unknown preset {0:?}")]
    UnknownPreset(String),

    /// A required DOM node is missing or has the wrong type.
    #[error("DOM element #{id} unavailable: {reason}")]
    Dom { id: &'static str, reason: String },

    #[error("WebGL2 context unavailable: {0}")]
    Context(String),

    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("shader program failed to link: {log}")]
    ProgramLink { log: String },

    /// Creating a GPU object (buffer, texture, program) returned null.
    #[error("failed to create GPU {0}")]
    Resource(&'static str),

    #[error("analyser fft size {0} is not a power of two in 32..=32768")]
    AnalyserSize(u32),

    #[error("audio graph error: {0}")]
    Audio(String),

    #[error("playback failed: {0}")]
    Playback(String),

    /// The upload endpoint answered with an error payload.
    #[error("upload rejected: {0}")]
    Upload(String),

    #[error("request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("no visualizer variables loaded")]
    NoConfig,
}
