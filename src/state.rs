//! Application state management

use std::sync::Arc;

use crate::config::{Config, EngineBackend};
use crate::ocr::{CommandEngine, OcrEngine, ServingEngine};

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("the command backend is selected but OCR_ENGINE_COMMAND is empty")]
    MissingEngineCommand,
}

/// Shared application state
///
/// Holds the process-scoped engine singleton; requests borrow it, they
/// never construct their own.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    engine: Arc<dyn OcrEngine>,
}

impl AppState {
    /// Build the engine selected by `config` and wrap it in state.
    pub fn new(config: Config) -> Result<Self, StateError> {
        let engine: Arc<dyn OcrEngine> = match config.engine.backend {
            EngineBackend::Command => {
                let mut parts = config.engine.command.iter();
                let program = parts
                    .next()
                    .cloned()
                    .ok_or(StateError::MissingEngineCommand)?;
                let args = parts.cloned().collect();
                Arc::new(CommandEngine::new(program, args, config.engine.lang.clone()))
            }
            EngineBackend::Serving => Arc::new(ServingEngine::new(
                &config.engine.serving_url,
                &config.engine.lang,
            )),
        };

        tracing::info!("OCR engine initialized ({} backend)", engine.name());

        Ok(Self::with_engine(config, engine))
    }

    /// Wrap a specific engine. Tests use this to stub inference.
    pub fn with_engine(config: Config, engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, engine }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn engine(&self) -> &dyn OcrEngine {
        self.inner.engine.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_backend_requires_a_command() {
        let mut config = Config::default();
        config.engine.backend = EngineBackend::Command;
        config.engine.command = Vec::new();

        assert!(matches!(
            AppState::new(config),
            Err(StateError::MissingEngineCommand)
        ));
    }

    #[test]
    fn serving_backend_builds_from_defaults() {
        let state = AppState::new(Config::default()).unwrap();
        assert_eq!(state.engine().name(), "serving");
    }
}
