use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::{CropMetadata, MetadataSource, PredictionResult};

/// Stand-in for crops the catalog does not list.
pub const UNKNOWN_CROP: CropMetadata = CropMetadata {
    category: "Unknown",
    season: "Unknown",
    water: "Unknown",
    glyph: "🌱",
};

const fn crop(
    category: &'static str,
    season: &'static str,
    water: &'static str,
    glyph: &'static str,
) -> CropMetadata {
    CropMetadata { category, season, water, glyph }
}

// Keys are stored lower-case; lookups normalize the query instead.
static CATALOG: LazyLock<HashMap<&'static str, CropMetadata>> = LazyLock::new(|| {
    HashMap::from([
        ("rice", crop("Grains", "Monsoon", "High", "🌾")),
        ("maize", crop("Grains", "Summer", "Moderate", "🌽")),
        ("chickpea", crop("Pulses", "Winter", "Low", "🫘")),
        ("kidneybeans", crop("Pulses", "Summer", "Moderate", "🫘")),
        ("pigeonpeas", crop("Pulses", "Monsoon", "Low", "🫘")),
        ("mothbeans", crop("Pulses", "Summer", "Low", "🫘")),
        ("mungbean", crop("Pulses", "Summer", "Moderate", "🫘")),
        ("blackgram", crop("Pulses", "Summer", "Moderate", "🫘")),
        ("lentil", crop("Pulses", "Winter", "Low", "🫘")),
        ("pomegranate", crop("Fruits", "Year-round", "Moderate", "🍎")),
        ("banana", crop("Fruits", "Year-round", "High", "🍌")),
        ("mango", crop("Fruits", "Summer", "Moderate", "🥭")),
        ("grapes", crop("Fruits", "Summer", "Moderate", "🍇")),
        ("watermelon", crop("Fruits", "Summer", "High", "🍉")),
        ("muskmelon", crop("Fruits", "Summer", "High", "🍈")),
        ("apple", crop("Fruits", "Autumn", "Moderate", "🍎")),
        ("orange", crop("Fruits", "Winter", "Moderate", "🍊")),
        ("papaya", crop("Fruits", "Year-round", "High", "🥭")),
        ("coconut", crop("Others", "Year-round", "High", "🥥")),
        ("cotton", crop("Others", "Summer", "Moderate", "🧶")),
        ("jute", crop("Others", "Monsoon", "High", "🧶")),
        ("coffee", crop("Others", "Year-round", "Moderate", "☕")),
    ])
});

/// Case-insensitive catalog lookup.
pub fn lookup(name: &str) -> Option<&'static CropMetadata> {
    CATALOG.get(name.trim().to_lowercase().as_str())
}

/// Builds the rendered result for a predicted label. Never fails: unlisted
/// crops get [`UNKNOWN_CROP`].
pub fn resolve(name: &str) -> PredictionResult {
    let (metadata, metadata_source) = match lookup(name) {
        Some(meta) => (*meta, MetadataSource::Catalog),
        None => (UNKNOWN_CROP, MetadataSource::Placeholder),
    };

    PredictionResult {
        crop: name.to_string(),
        metadata,
        metadata_source,
    }
}

pub fn catalog_size() -> usize {
    CATALOG.len()
}
