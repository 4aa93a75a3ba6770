use crate::core::config::{OcrBackendConfig, OcrConfig, SelectionPolicy};
use crate::ocr::{CommandBackend, TesseractBackend};
use crate::plugins::{OcrBackend, OcrOutput};
use crate::text::normalize;
use crate::types::{EngineId, OcrResult};
use crate::{EvalError, Result};
use std::path::Path;
use std::sync::Arc;

/// Chains OCR backends in priority order and picks one result.
///
/// If any backend yields non-empty text the selector returns non-empty text,
/// tagged with the engine that produced it. When no backend yields text, whether
/// they failed or read nothing, the call fails with `EvalError::OcrFailure`
/// summarizing each attempt.
#[derive(Clone)]
pub struct OcrSelector {
    backends: Vec<Arc<dyn OcrBackend>>,
    config: OcrConfig,
}

struct Candidate {
    engine: EngineId,
    text: String,
    output: OcrOutput,
}

#[derive(Default)]
struct Attempts {
    failures: Vec<String>,
}

impl Attempts {
    fn record(&mut self, engine: &EngineId, reason: impl std::fmt::Display) {
        self.failures.push(format!("{}: {}", engine, reason));
    }
}

impl OcrSelector {
    /// Create a selector over `backends`, highest priority first.
    pub fn new(backends: Vec<Arc<dyn OcrBackend>>, config: OcrConfig) -> Self {
        Self { backends, config }
    }

    /// Build the backend chain described by `config.backends`.
    pub fn from_config(config: &OcrConfig) -> Result<Self> {
        if config.backends.is_empty() {
            return Err(EvalError::validation("At least one OCR backend must be configured"));
        }

        let backends = config
            .backends
            .iter()
            .map(|backend| -> Arc<dyn OcrBackend> {
                match backend {
                    OcrBackendConfig::Tesseract {
                        binary,
                        psm,
                        timeout_secs,
                    } => Arc::new(TesseractBackend::new(binary.clone(), *psm, *timeout_secs)),
                    OcrBackendConfig::Command {
                        engine,
                        program,
                        args,
                        timeout_secs,
                        languages,
                    } => Arc::new(
                        CommandBackend::new(EngineId::parse(engine), program.clone(), args.clone(), *timeout_secs)
                            .with_languages(languages.clone()),
                    ),
                }
            })
            .collect();

        Ok(Self::new(backends, config.clone()))
    }

    pub fn backends(&self) -> &[Arc<dyn OcrBackend>] {
        &self.backends
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// Initialize every backend.
    pub fn initialize(&self) -> Result<()> {
        for backend in &self.backends {
            backend.initialize().map_err(|e| EvalError::Plugin {
                message: e.to_string(),
                plugin_name: backend.name().to_string(),
            })?;
        }
        Ok(())
    }

    /// Shut every backend down, reporting the first failure.
    pub fn shutdown(&self) -> Result<()> {
        let mut first_error = None;
        for backend in &self.backends {
            if let Err(e) = backend.shutdown() {
                tracing::warn!("OCR backend '{}' failed to shut down: {}", backend.name(), e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Recognize the document at `document_path`.
    ///
    /// # Errors
    ///
    /// - `EvalError::OcrFailure` - no backend produced non-empty text
    #[cfg_attr(feature = "otel", tracing::instrument(skip(self, document_path), fields(path = %document_path.as_ref().display())))]
    pub async fn extract(&self, document_path: impl AsRef<Path>) -> Result<OcrResult> {
        let path = document_path.as_ref();
        let mut attempts = Attempts::default();

        let chosen = match self.config.policy {
            SelectionPolicy::FirstSuccess => self.first_success(path, &mut attempts).await,
            SelectionPolicy::HighestConfidence => self.highest_confidence(path, &mut attempts).await,
        };

        let Some(candidate) = chosen else {
            let summary = if attempts.failures.is_empty() {
                "no OCR backends configured".to_string()
            } else {
                attempts.failures.join("; ")
            };
            return Err(EvalError::ocr_failure(format!(
                "all OCR backends failed for {}: {}",
                path.display(),
                summary
            )));
        };

        let detected_language = self.resolve_language(&candidate);
        tracing::debug!(
            "OCR selected engine '{}' ({} chars, language {})",
            candidate.engine,
            candidate.text.chars().count(),
            detected_language
        );

        Ok(OcrResult {
            extracted_text: candidate.text,
            engine: candidate.engine,
            detected_language,
        })
    }

    async fn first_success(&self, path: &Path, attempts: &mut Attempts) -> Option<Candidate> {
        for backend in &self.backends {
            if let Some(candidate) = self.run_backend(backend.as_ref(), path, attempts).await {
                return Some(candidate);
            }
        }
        None
    }

    async fn highest_confidence(&self, path: &Path, attempts: &mut Attempts) -> Option<Candidate> {
        let mut best: Option<(f64, Candidate)> = None;

        for backend in &self.backends {
            let Some(candidate) = self.run_backend(backend.as_ref(), path, attempts).await else {
                continue;
            };

            let confidence = candidate.output.confidence.unwrap_or(0.0);
            // strictly greater keeps the earlier backend on ties
            if best.as_ref().is_none_or(|(best_confidence, _)| confidence > *best_confidence) {
                best = Some((confidence, candidate));
            }
        }

        best.map(|(_, candidate)| candidate)
    }

    async fn run_backend(
        &self,
        backend: &dyn OcrBackend,
        path: &Path,
        attempts: &mut Attempts,
    ) -> Option<Candidate> {
        let engine = backend.engine();

        if !backend.is_available().await {
            tracing::warn!("OCR backend '{}' is not available, skipping", engine);
            attempts.record(&engine, "not available");
            return None;
        }

        if !backend.supports_language(&self.config.language) {
            tracing::debug!(
                "OCR backend '{}' does not list language '{}'",
                engine,
                self.config.language
            );
        }

        match backend.process_file(path, &self.config).await {
            Ok(output) => {
                let text = normalize(&output.text);
                if text.is_empty() {
                    tracing::warn!("OCR backend '{}' returned no text for {}", engine, path.display());
                    attempts.record(&engine, "empty text");
                    None
                } else {
                    Some(Candidate { engine, text, output })
                }
            }
            Err(e) => {
                tracing::warn!("OCR backend '{}' failed for {}: {}", engine, path.display(), e);
                attempts.record(&engine, &e);
                None
            }
        }
    }

    fn resolve_language(&self, candidate: &Candidate) -> String {
        if let Some(language) = candidate.output.language.as_deref().filter(|l| !l.trim().is_empty()) {
            return language.to_string();
        }

        detect_language(&candidate.text).unwrap_or_else(|| self.config.language.clone())
    }
}

#[cfg(feature = "language-detection")]
fn detect_language(text: &str) -> Option<String> {
    crate::language_detection::detect_language(text)
}

#[cfg(not(feature = "language-detection"))]
fn detect_language(_text: &str) -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::Plugin;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubBackend {
        engine: EngineId,
        result: std::result::Result<OcrOutput, String>,
        available: bool,
        calls: AtomicUsize,
    }

    impl StubBackend {
        fn ok(engine: EngineId, output: OcrOutput) -> Arc<Self> {
            Arc::new(Self {
                engine,
                result: Ok(output),
                available: true,
                calls: AtomicUsize::new(0),
            })
        }

        fn err(engine: EngineId, message: &str) -> Arc<Self> {
            Arc::new(Self {
                engine,
                result: Err(message.to_string()),
                available: true,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Plugin for StubBackend {
        fn name(&self) -> &str {
            self.engine.as_str()
        }
        fn version(&self) -> String {
            "0.0.0".to_string()
        }
        fn initialize(&self) -> Result<()> {
            Ok(())
        }
        fn shutdown(&self) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl OcrBackend for StubBackend {
        async fn process_file(&self, _path: &Path, _config: &OcrConfig) -> Result<OcrOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(EvalError::ocr)
        }

        fn engine(&self) -> EngineId {
            self.engine.clone()
        }

        async fn is_available(&self) -> bool {
            self.available
        }
    }

    fn config(policy: SelectionPolicy) -> OcrConfig {
        OcrConfig {
            policy,
            ..OcrConfig::default()
        }
    }

    #[tokio::test]
    async fn test_first_success_stops_at_first_text() {
        let first = StubBackend::ok(EngineId::TrOcr, OcrOutput::new("  Plants\nmake   glucose "));
        let second = StubBackend::ok(EngineId::Tesseract, OcrOutput::new("other"));
        let selector = OcrSelector::new(
            vec![first.clone(), second.clone()],
            config(SelectionPolicy::FirstSuccess),
        );

        let result = selector.extract("answer.png").await.unwrap();
        assert_eq!(result.extracted_text, "Plants make glucose");
        assert_eq!(result.engine, EngineId::TrOcr);
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_on_error_and_whitespace_text() {
        let failing = StubBackend::err(EngineId::TrOcr, "model crashed");
        let blank = StubBackend::ok(EngineId::Paddle, OcrOutput::new(" \n\t "));
        let working = StubBackend::ok(EngineId::Tesseract, OcrOutput::new("Chlorophyll absorbs light"));
        let selector = OcrSelector::new(vec![failing, blank, working], config(SelectionPolicy::FirstSuccess));

        let result = selector.extract("answer.png").await.unwrap();
        assert_eq!(result.engine, EngineId::Tesseract);
        assert_eq!(result.extracted_text, "Chlorophyll absorbs light");
    }

    #[tokio::test]
    async fn test_all_backends_fail_reports_each() {
        let selector = OcrSelector::new(
            vec![
                StubBackend::err(EngineId::TrOcr, "model crashed"),
                StubBackend::ok(EngineId::Tesseract, OcrOutput::new("")),
            ],
            config(SelectionPolicy::FirstSuccess),
        );

        let err = selector.extract("answer.png").await.unwrap_err();
        assert!(matches!(err, EvalError::OcrFailure { .. }));
        let message = err.to_string();
        assert!(message.contains("trocr"));
        assert!(message.contains("model crashed"));
        assert!(message.contains("tesseract: empty text"));
    }

    #[tokio::test]
    async fn test_all_backends_empty_is_ocr_failure() {
        for policy in [SelectionPolicy::FirstSuccess, SelectionPolicy::HighestConfidence] {
            let selector = OcrSelector::new(
                vec![
                    StubBackend::ok(EngineId::TrOcr, OcrOutput::new("")),
                    StubBackend::ok(EngineId::Tesseract, OcrOutput::new("\n\n")),
                ],
                config(policy),
            );

            let err = selector.extract("blank.png").await.unwrap_err();
            assert!(matches!(err, EvalError::OcrFailure { .. }));
            let message = err.to_string();
            assert!(message.contains("trocr: empty text"));
            assert!(message.contains("tesseract: empty text"));
        }
    }

    #[tokio::test]
    async fn test_no_backends_is_ocr_failure() {
        let selector = OcrSelector::new(vec![], OcrConfig::default());
        let err = selector.extract("answer.png").await.unwrap_err();
        assert!(matches!(err, EvalError::OcrFailure { .. }));
    }

    #[tokio::test]
    async fn test_unavailable_backend_skipped() {
        let unavailable = Arc::new(StubBackend {
            engine: EngineId::Paddle,
            result: Ok(OcrOutput::new("never returned")),
            available: false,
            calls: AtomicUsize::new(0),
        });
        let working = StubBackend::ok(EngineId::Tesseract, OcrOutput::new("text"));
        let selector = OcrSelector::new(
            vec![unavailable.clone(), working],
            config(SelectionPolicy::FirstSuccess),
        );

        let result = selector.extract("answer.png").await.unwrap();
        assert_eq!(result.engine, EngineId::Tesseract);
        assert_eq!(unavailable.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_highest_confidence_picks_max() {
        let selector = OcrSelector::new(
            vec![
                StubBackend::ok(EngineId::Tesseract, OcrOutput::new("low").with_confidence(0.4)),
                StubBackend::ok(EngineId::TrOcr, OcrOutput::new("high").with_confidence(0.9)),
                StubBackend::ok(EngineId::Paddle, OcrOutput::new("unknown")),
            ],
            config(SelectionPolicy::HighestConfidence),
        );

        let result = selector.extract("answer.png").await.unwrap();
        assert_eq!(result.engine, EngineId::TrOcr);
        assert_eq!(result.extracted_text, "high");
    }

    #[tokio::test]
    async fn test_highest_confidence_tie_keeps_priority() {
        let selector = OcrSelector::new(
            vec![
                StubBackend::ok(EngineId::Paddle, OcrOutput::new("first").with_confidence(0.7)),
                StubBackend::ok(EngineId::TrOcr, OcrOutput::new("second").with_confidence(0.7)),
            ],
            config(SelectionPolicy::HighestConfidence),
        );

        let result = selector.extract("answer.png").await.unwrap();
        assert_eq!(result.engine, EngineId::Paddle);
    }

    #[tokio::test]
    async fn test_reported_language_wins() {
        let selector = OcrSelector::new(
            vec![StubBackend::ok(
                EngineId::Paddle,
                OcrOutput::new("The cell membrane controls what enters the cell.").with_language("hin"),
            )],
            OcrConfig::default(),
        );

        let result = selector.extract("answer.png").await.unwrap();
        assert_eq!(result.detected_language, "hin");
    }

    #[tokio::test]
    async fn test_language_falls_back_to_config_for_short_text() {
        let selector = OcrSelector::new(
            vec![StubBackend::ok(EngineId::Tesseract, OcrOutput::new("42"))],
            OcrConfig {
                language: "tam".to_string(),
                ..OcrConfig::default()
            },
        );

        let result = selector.extract("answer.png").await.unwrap();
        assert_eq!(result.detected_language, "tam");
    }

    #[test]
    fn test_from_config_builds_chain_in_order() {
        let config = OcrConfig {
            backends: vec![
                OcrBackendConfig::Command {
                    engine: "paddleocr".to_string(),
                    program: "paddleocr".to_string(),
                    args: vec!["--image_dir".to_string(), "{path}".to_string()],
                    timeout_secs: 60,
                    languages: vec![],
                },
                OcrBackendConfig::Tesseract {
                    binary: "tesseract".to_string(),
                    psm: 6,
                    timeout_secs: 60,
                },
            ],
            ..OcrConfig::default()
        };

        let selector = OcrSelector::from_config(&config).unwrap();
        let engines: Vec<EngineId> = selector.backends().iter().map(|b| b.engine()).collect();
        assert_eq!(engines, vec![EngineId::Paddle, EngineId::Tesseract]);
        assert!(selector.initialize().is_ok());
        assert!(selector.shutdown().is_ok());
    }

    #[test]
    fn test_from_config_rejects_empty_chain() {
        let config = OcrConfig {
            backends: vec![],
            ..OcrConfig::default()
        };
        assert!(OcrSelector::from_config(&config).is_err());
    }
}
