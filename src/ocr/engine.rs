//! OCR engine backends
//!
//! The engine is an opaque collaborator: give it the path of a staged
//! image, get back its raw JSON result in whatever shape its version
//! emits. One engine is constructed at startup and shared for the process
//! lifetime; a slow or stuck inference stalls only its own request.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use super::types::EngineError;

/// Recognition backend. `recognize` blocks (from the caller's point of
/// view) until the engine has produced a result or failed; there is no
/// timeout and no retry here.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &'static str;

    /// Run recognition on the image at `image_path`.
    async fn recognize(&self, image_path: &Path) -> Result<Value, EngineError>;
}

/// Runs a helper program that prints the raw engine result as JSON on
/// stdout. The helper is invoked as
/// `<program> <args..> --lang <lang> <image_path>`.
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
    lang: String,
}

impl CommandEngine {
    pub fn new(program: String, args: Vec<String>, lang: String) -> Self {
        Self {
            program,
            args,
            lang,
        }
    }
}

#[async_trait]
impl OcrEngine for CommandEngine {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn recognize(&self, image_path: &Path) -> Result<Value, EngineError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--lang")
            .arg(&self.lang)
            .arg(image_path)
            .output()
            .await
            .map_err(|e| EngineError::Launch(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Process(stderr.trim().to_string()));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| EngineError::MalformedOutput(e.to_string()))
    }
}

/// Talks to a recognition sidecar over HTTP. The sidecar receives the
/// image as base64 and replies with the engine's native result JSON.
pub struct ServingEngine {
    client: reqwest::Client,
    url: String,
    lang: String,
}

impl ServingEngine {
    pub fn new(url: &str, lang: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            lang: lang.to_string(),
        }
    }
}

#[async_trait]
impl OcrEngine for ServingEngine {
    fn name(&self) -> &'static str {
        "serving"
    }

    async fn recognize(&self, image_path: &Path) -> Result<Value, EngineError> {
        use base64::Engine;

        let image = tokio::fs::read(image_path)
            .await
            .map_err(|e| EngineError::Api(format!("failed to read staged image: {}", e)))?;

        let request = serde_json::json!({
            "image": base64::engine::general_purpose::STANDARD.encode(&image),
            "lang": self.lang,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::Api(format!("failed to call OCR serving: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Api(format!(
                "OCR serving returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| EngineError::MalformedOutput(e.to_string()))
    }
}

/// Stub engine for tests. Replays a canned result (or failure) and records
/// every path it was asked to read.
#[cfg(test)]
pub struct MockEngine {
    result: std::result::Result<Value, String>,
    pub seen_paths: std::sync::Mutex<Vec<std::path::PathBuf>>,
}

#[cfg(test)]
impl MockEngine {
    pub fn returning(result: Value) -> Self {
        Self {
            result: Ok(result),
            seen_paths: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            seen_paths: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl OcrEngine for MockEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn recognize(&self, image_path: &Path) -> Result<Value, EngineError> {
        self.seen_paths
            .lock()
            .unwrap()
            .push(image_path.to_path_buf());

        match &self.result {
            Ok(value) => Ok(value.clone()),
            Err(message) => Err(EngineError::Process(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn command_engine_reports_unlaunchable_programs() {
        let engine = CommandEngine::new(
            "definitely-not-a-real-ocr-helper".to_string(),
            Vec::new(),
            "en".to_string(),
        );

        let err = engine
            .recognize(Path::new("/tmp/missing.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Launch(_)));
    }

    #[tokio::test]
    async fn command_engine_rejects_non_json_output() {
        // `echo` prints its own arguments back, which is not JSON.
        let engine = CommandEngine::new("echo".to_string(), Vec::new(), "en".to_string());

        let err = engine.recognize(Path::new("image.jpg")).await.unwrap_err();
        assert!(matches!(err, EngineError::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn command_engine_parses_helper_stdout() {
        // The shell swallows the trailing `--lang en <path>` arguments and
        // prints a fixed result, standing in for a real helper.
        let engine = CommandEngine::new(
            "sh".to_string(),
            vec!["-c".to_string(), "echo '[]'".to_string(), "ocr-helper".to_string()],
            "en".to_string(),
        );

        let raw = engine.recognize(Path::new("image.jpg")).await.unwrap();
        assert_eq!(raw, serde_json::json!([]));
    }
}
