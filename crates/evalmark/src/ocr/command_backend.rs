use crate::core::config::OcrConfig;
use crate::ocr::subprocess::{program_available, run_ocr_command};
use crate::plugins::{OcrBackend, OcrOutput, Plugin};
use crate::types::EngineId;
use crate::{EvalError, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::path::Path;

/// OCR backend that shells out to an external recognizer.
///
/// Used for engines without a native Rust binding, such as a TrOCR or
/// PaddleOCR script. `{path}` and `{lang}` in the argument template are
/// replaced per call. The program prints either plain text or a JSON object
/// `{"text": ..., "confidence": ..., "language": ...}` on stdout.
pub struct CommandBackend {
    engine: EngineId,
    program: String,
    args: Vec<String>,
    timeout_secs: u64,
    languages: Vec<String>,
    available: OnceCell<bool>,
}

impl CommandBackend {
    pub fn new(engine: EngineId, program: impl Into<String>, args: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            engine,
            program: program.into(),
            args,
            timeout_secs,
            languages: Vec::new(),
            available: OnceCell::new(),
        }
    }

    /// Restrict the backend to the given language codes.
    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    fn render_args(&self, path: &Path, language: &str) -> Vec<String> {
        let path = path.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{path}", &path).replace("{lang}", language))
            .collect()
    }
}

impl Plugin for CommandBackend {
    fn name(&self) -> &str {
        self.engine.as_str()
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl OcrBackend for CommandBackend {
    async fn process_file(&self, path: &Path, config: &OcrConfig) -> Result<OcrOutput> {
        let args = self.render_args(path, &config.language);
        let stdout = run_ocr_command(&self.program, &args, self.timeout_secs).await?;
        parse_stdout(&stdout)
    }

    fn engine(&self) -> EngineId {
        self.engine.clone()
    }

    fn supports_language(&self, lang: &str) -> bool {
        self.languages.is_empty() || self.languages.iter().any(|l| l == lang)
    }

    async fn is_available(&self) -> bool {
        if let Some(available) = self.available.get() {
            return *available;
        }

        let available = program_available(&self.program, self.timeout_secs).await;
        let _ = self.available.set(available);
        available
    }
}

fn parse_stdout(stdout: &str) -> Result<OcrOutput> {
    let trimmed = stdout.trim_start();
    if trimmed.starts_with('{') {
        serde_json::from_str(trimmed)
            .map_err(|e| EvalError::ocr_with_source("OCR program printed malformed JSON", e))
    } else {
        Ok(OcrOutput::new(stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_args_substitutes_placeholders() {
        let backend = CommandBackend::new(
            EngineId::TrOcr,
            "python3",
            vec!["trocr.py".to_string(), "--image={path}".to_string(), "{lang}".to_string()],
            60,
        );
        let args = backend.render_args(Path::new("/data/answer.png"), "eng");
        assert_eq!(args, vec!["trocr.py", "--image=/data/answer.png", "eng"]);
    }

    #[test]
    fn test_parse_stdout_plain_text() {
        let output = parse_stdout("Plants make glucose\n").unwrap();
        assert_eq!(output.text, "Plants make glucose\n");
        assert_eq!(output.confidence, None);
    }

    #[test]
    fn test_parse_stdout_json() {
        let output = parse_stdout(r#"  {"text": "प्रकाश संश्लेषण", "confidence": 0.82, "language": "hin"}"#).unwrap();
        assert_eq!(output.text, "प्रकाश संश्लेषण");
        assert_eq!(output.confidence, Some(0.82));
        assert_eq!(output.language.as_deref(), Some("hin"));
    }

    #[test]
    fn test_parse_stdout_malformed_json() {
        let err = parse_stdout("{not json").unwrap_err();
        assert!(matches!(err, EvalError::Ocr { .. }));
    }

    #[test]
    fn test_supports_language() {
        let any = CommandBackend::new(EngineId::Paddle, "paddleocr", vec![], 60);
        assert!(any.supports_language("hin"));

        let restricted = any.with_languages(vec!["hin".to_string(), "tam".to_string()]);
        assert!(restricted.supports_language("tam"));
        assert!(!restricted.supports_language("eng"));
        assert_eq!(restricted.name(), "paddle");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_file_runs_program() {
        let backend = CommandBackend::new(
            EngineId::Custom("echo".to_string()),
            "sh",
            vec!["-c".to_string(), "printf '%s' \"$0\"".to_string(), "{path}".to_string()],
            5,
        );
        let output = backend
            .process_file(Path::new("answer.png"), &OcrConfig::default())
            .await
            .unwrap();
        assert_eq!(output.text, "answer.png");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_availability_probed_once_and_bounded() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("probes");
        let script = dir.path().join("trocr.sh");
        std::fs::write(
            &script,
            format!("#!/bin/sh\necho probe >> '{}'\nsleep 30\n", counter.display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let backend = CommandBackend::new(EngineId::TrOcr, script.to_string_lossy(), vec![], 1);

        let started = std::time::Instant::now();
        assert!(backend.is_available().await);
        assert!(backend.is_available().await);
        assert!(started.elapsed() < std::time::Duration::from_secs(10));

        let probes = std::fs::read_to_string(&counter).unwrap();
        assert_eq!(probes.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_missing_program_unavailable() {
        let backend = CommandBackend::new(EngineId::Paddle, "evalmark-no-such-paddleocr", vec![], 5);
        assert!(!backend.is_available().await);
    }
}
