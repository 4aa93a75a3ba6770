use crate::Result;
use crate::core::config::OcrConfig;
use crate::ocr::subprocess::{program_available, run_ocr_command};
use crate::plugins::{OcrBackend, OcrOutput, Plugin};
use crate::types::EngineId;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::path::Path;

/// Tesseract OCR backend, driving the `tesseract` command-line program.
///
/// Output is requested as TSV so word confidences are available. The reported
/// confidence is the mean word confidence scaled to `[0, 1]`.
pub struct TesseractBackend {
    binary: String,
    psm: u8,
    timeout_secs: u64,
    available: OnceCell<bool>,
}

impl TesseractBackend {
    pub fn new(binary: impl Into<String>, psm: u8, timeout_secs: u64) -> Self {
        Self {
            binary: binary.into(),
            psm,
            timeout_secs,
            available: OnceCell::new(),
        }
    }

    fn command_args(&self, path: &Path, language: &str) -> Vec<String> {
        vec![
            path.to_string_lossy().into_owned(),
            "stdout".to_string(),
            "-l".to_string(),
            language.to_string(),
            "--psm".to_string(),
            self.psm.to_string(),
            "tsv".to_string(),
        ]
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new("tesseract", 6, 120)
    }
}

impl Plugin for TesseractBackend {
    fn name(&self) -> &str {
        "tesseract"
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

    fn description(&self) -> &str {
        "Printed Latin-script text via the tesseract CLI"
    }
}

#[async_trait]
impl OcrBackend for TesseractBackend {
    async fn process_file(&self, path: &Path, config: &OcrConfig) -> Result<OcrOutput> {
        let args = self.command_args(path, &config.language);
        let tsv = run_ocr_command(&self.binary, &args, self.timeout_secs).await?;

        let (text, confidence) = parse_tsv(&tsv);
        tracing::debug!(
            "Tesseract recognized {} characters from {} (confidence {:?})",
            text.chars().count(),
            path.display(),
            confidence
        );

        let mut output = OcrOutput::new(text);
        if let Some(confidence) = confidence {
            output = output.with_confidence(confidence);
        }
        Ok(output)
    }

    fn engine(&self) -> EngineId {
        EngineId::Tesseract
    }

    fn supports_language(&self, lang: &str) -> bool {
        // tesseract accepts "eng+deu" style combinations of three-letter codes
        !lang.is_empty()
            && lang
                .split('+')
                .all(|part| part.len() >= 3 && part.chars().all(|c| c.is_ascii_lowercase() || c == '_'))
    }

    async fn is_available(&self) -> bool {
        if let Some(available) = self.available.get() {
            return *available;
        }

        let available = program_available(&self.binary, self.timeout_secs).await;
        let _ = self.available.set(available);
        available
    }
}

/// Reassemble text and mean word confidence from tesseract TSV output.
///
/// Words (level 5) are joined with spaces inside a line and lines with `\n`.
/// Rows with negative confidence carry no text and are skipped.
pub(crate) fn parse_tsv(tsv: &str) -> (String, Option<f64>) {
    let mut lines: Vec<String> = Vec::new();
    let mut current_key: Option<(u32, u32, u32, u32)> = None;
    let mut conf_sum = 0.0;
    let mut word_count = 0usize;

    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 || cols[0] != "5" {
            continue;
        }

        let conf: f64 = cols[10].trim().parse().unwrap_or(-1.0);
        let word = cols[11].trim();
        if word.is_empty() || conf < 0.0 {
            continue;
        }

        let key = (
            cols[1].parse().unwrap_or(0),
            cols[2].parse().unwrap_or(0),
            cols[3].parse().unwrap_or(0),
            cols[4].parse().unwrap_or(0),
        );

        match lines.last_mut() {
            Some(line) if current_key == Some(key) => {
                line.push(' ');
                line.push_str(word);
            }
            _ => {
                lines.push(word.to_string());
                current_key = Some(key);
            }
        }

        conf_sum += conf;
        word_count += 1;
    }

    let confidence = if word_count > 0 {
        Some((conf_sum / word_count as f64 / 100.0).clamp(0.0, 1.0))
    } else {
        None
    };

    (lines.join("\n"), confidence)
}
