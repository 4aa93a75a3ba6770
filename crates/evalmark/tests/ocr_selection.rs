//! OCR selector behaviour across backend chains and selection policies.

mod common;

use common::MockOcrBackend;
use evalmark::plugins::OcrOutput;
use evalmark::{EngineId, EvalError, OcrBackendConfig, OcrConfig, OcrSelector, SelectionPolicy};

fn config(policy: SelectionPolicy) -> OcrConfig {
    OcrConfig {
        policy,
        ..OcrConfig::default()
    }
}

#[tokio::test]
async fn test_first_backend_error_falls_back_to_second() {
    let trocr = MockOcrBackend::failing(EngineId::TrOcr, "CUDA out of memory");
    let tesseract = MockOcrBackend::returning(EngineId::Tesseract, "The heart pumps blood");
    let selector = OcrSelector::new(
        vec![trocr.clone(), tesseract.clone()],
        config(SelectionPolicy::FirstSuccess),
    );

    let result = selector.extract("sheet.png").await.unwrap();

    assert_eq!(result.engine, EngineId::Tesseract);
    assert_eq!(result.extracted_text, "The heart pumps blood");
    assert_eq!(trocr.call_count(), 1);
    assert_eq!(tesseract.call_count(), 1);
}

#[tokio::test]
async fn test_first_success_does_not_run_lower_priority() {
    let paddle = MockOcrBackend::returning(EngineId::Paddle, "रक्त परिसंचरण");
    let tesseract = MockOcrBackend::returning(EngineId::Tesseract, "unused");
    let selector = OcrSelector::new(
        vec![paddle.clone(), tesseract.clone()],
        config(SelectionPolicy::FirstSuccess),
    );

    let result = selector.extract("sheet.png").await.unwrap();

    assert_eq!(result.engine, EngineId::Paddle);
    assert_eq!(tesseract.call_count(), 0);
}

#[tokio::test]
async fn test_highest_confidence_runs_all_and_picks_best() {
    let tesseract = MockOcrBackend::with_output(
        EngineId::Tesseract,
        OcrOutput::new("Th3 h3art pumps").with_confidence(0.41),
    );
    let trocr = MockOcrBackend::with_output(
        EngineId::TrOcr,
        OcrOutput::new("The heart pumps blood").with_confidence(0.88),
    );
    let broken = MockOcrBackend::failing(EngineId::Paddle, "segfault");
    let selector = OcrSelector::new(
        vec![tesseract.clone(), broken, trocr.clone()],
        config(SelectionPolicy::HighestConfidence),
    );

    let result = selector.extract("sheet.png").await.unwrap();

    assert_eq!(result.engine, EngineId::TrOcr);
    assert_eq!(result.extracted_text, "The heart pumps blood");
    assert_eq!(tesseract.call_count(), 1);
    assert_eq!(trocr.call_count(), 1);
}

#[tokio::test]
async fn test_highest_confidence_missing_confidence_counts_as_zero() {
    let selector = OcrSelector::new(
        vec![
            MockOcrBackend::returning(EngineId::Paddle, "no confidence"),
            MockOcrBackend::with_output(EngineId::Tesseract, OcrOutput::new("low").with_confidence(0.05)),
        ],
        config(SelectionPolicy::HighestConfidence),
    );

    let result = selector.extract("sheet.png").await.unwrap();
    assert_eq!(result.engine, EngineId::Tesseract);
}

#[tokio::test]
async fn test_every_backend_failing_is_ocr_failure() {
    let selector = OcrSelector::new(
        vec![
            MockOcrBackend::failing(EngineId::TrOcr, "corrupt image"),
            MockOcrBackend::returning(EngineId::Paddle, "   "),
        ],
        config(SelectionPolicy::HighestConfidence),
    );

    let err = selector.extract("sheet.png").await.unwrap_err();
    assert!(matches!(err, EvalError::OcrFailure { .. }));
    assert!(err.is_client_error());
}

#[cfg(unix)]
#[tokio::test]
async fn test_configured_command_chain() {
    let config = OcrConfig {
        language: "eng".to_string(),
        policy: SelectionPolicy::FirstSuccess,
        backends: vec![
            OcrBackendConfig::Command {
                engine: "trocr".to_string(),
                program: "sh".to_string(),
                args: vec!["-c".to_string(), "exit 1".to_string()],
                timeout_secs: 5,
                languages: vec![],
            },
            OcrBackendConfig::Command {
                engine: "paddle".to_string(),
                program: "sh".to_string(),
                args: vec![
                    "-c".to_string(),
                    r#"printf '{"text": "Blood carries oxygen", "confidence": 0.7, "language": "%s"}' "$0""#.to_string(),
                    "{lang}".to_string(),
                ],
                timeout_secs: 5,
                languages: vec![],
            },
        ],
    };

    let selector = OcrSelector::from_config(&config).unwrap();
    let result = selector.extract("sheet.png").await.unwrap();

    assert_eq!(result.engine, EngineId::Paddle);
    assert_eq!(result.extracted_text, "Blood carries oxygen");
    assert_eq!(result.detected_language, "eng");
}

#[tokio::test]
async fn test_missing_program_is_ocr_failure() {
    let config = OcrConfig {
        backends: vec![OcrBackendConfig::Tesseract {
            binary: "evalmark-test-missing-tesseract".to_string(),
            psm: 6,
            timeout_secs: 5,
        }],
        ..OcrConfig::default()
    };

    let selector = OcrSelector::from_config(&config).unwrap();
    let err = selector.extract("sheet.png").await.unwrap_err();

    assert!(matches!(err, EvalError::OcrFailure { .. }));
    assert!(err.to_string().contains("tesseract: not available"));
}
