//! Base plugin trait definition.
//!
//! OCR backends and other pluggable collaborators implement `Plugin`, which
//! provides identification and lifecycle hooks.

use crate::Result;

/// Base trait that all plugins must implement.
///
/// # Thread Safety
///
/// Plugins are shared as `Arc<dyn ...>` across concurrent evaluations and must
/// be `Send + Sync`.
///
/// # Example
///
/// ```rust
/// use evalmark::plugins::Plugin;
/// use evalmark::Result;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct WarmupPlugin {
///     ready: AtomicBool,
/// }
///
/// impl Plugin for WarmupPlugin {
///     fn name(&self) -> &str {
///         "warmup"
///     }
///
///     fn version(&self) -> String {
///         "1.0.0".to_string()
///     }
///
///     fn initialize(&self) -> Result<()> {
///         self.ready.store(true, Ordering::Release);
///         Ok(())
///     }
///
///     fn shutdown(&self) -> Result<()> {
///         self.ready.store(false, Ordering::Release);
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    /// Unique, kebab-case identifier (e.g. `"tesseract"`, `"trocr"`).
    fn name(&self) -> &str;

    /// Semantic version of the plugin or the tool it wraps.
    fn version(&self) -> String;

    /// Called once before the plugin is used.
    ///
    /// Takes `&self` to work with `Arc<dyn Plugin>`; use interior mutability
    /// for any state set up here.
    fn initialize(&self) -> Result<()>;

    /// Release resources. Called when the owning selector is shut down.
    fn shutdown(&self) -> Result<()>;

    /// Optional human-readable description.
    fn description(&self) -> &str {
        ""
    }
}
