/// Invalid construction parameters.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("target frame rate must be finite and positive, got {0}")]
    InvalidTargetFps(f32),

    #[error("no drawable surface: the window reports a zero-sized drawable")]
    MissingSurface,
}

/// Failures reported by the frame scheduler.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("scheduler has been disposed")]
    Disposed,

    /// `restart` was requested before any callback was registered with `draw`.
    #[error("no render callback registered; call draw first")]
    NotStarted,

    /// The render callback failed; the loop is stopped until `draw` is called again.
    #[error("render callback failed")]
    Callback(#[source] anyhow::Error),

    /// The surface could not produce a frame; the loop is stopped.
    #[error("surface failed to begin a frame")]
    Surface(#[source] anyhow::Error),
}
