//! Cinequete Lang - Language detection and French translation
//!
//! Cleans up provider-supplied text, detects its language with a local
//! detector (remote side-channel as fallback), and translates non-French
//! text to French through a two-tier chunked translation pipeline.
//!
//! Nothing in this crate surfaces network or library failures to callers:
//! language enrichment is a display nicety, so every operation degrades to
//! "unknown" or pass-through instead of erroring.

pub mod mymemory;
pub mod service;
pub mod text;
pub mod translate;

// Re-export main types
pub use service::{LanguageService, badge_label};
pub use translate::{GoogleWebTranslator, MyMemoryTranslator, Translation, TranslationBackend};
