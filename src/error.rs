use {
    crate::{config::ConfigError, renderer::RendererError},
    std::fmt,
};

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    EventLoop(winit::error::EventLoopError),
    Window(winit::error::OsError),
    Renderer(RendererError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::EventLoop(e) => write!(f, "event loop error: {e}"),
            Self::Window(e) => write!(f, "failed to create window: {e}"),
            Self::Renderer(e) => write!(f, "failed to create renderer: {e}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::EventLoop(e) => Some(e),
            Self::Window(e) => Some(e),
            Self::Renderer(e) => Some(e),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        Self::EventLoop(e)
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        Self::Window(e)
    }
}

impl From<RendererError> for AppError {
    fn from(e: RendererError) -> Self {
        Self::Renderer(e)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::error::Error};

    #[test]
    fn config_errors_keep_their_source() {
        let error = AppError::from(ConfigError::NonFinite("electron_speed"));
        assert_eq!(
            error.to_string(),
            "invalid configuration: electron_speed is not finite"
        );
        assert!(error.source().is_some());
    }

    #[test]
    fn renderer_errors_are_wrapped() {
        let error = AppError::from(RendererError::UnsupportedSurface);
        assert!(matches!(error, AppError::Renderer(RendererError::UnsupportedSurface)));
        assert!(error.to_string().starts_with("failed to create renderer"));
    }
}
