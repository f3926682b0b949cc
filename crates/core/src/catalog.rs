use std::sync::Arc;

use crate::types::{Track, TrackCategory, TrackRef};

const BUILTIN_TRACKS: [(&str, &str, TrackCategory, u32, &str); 8] = [
    ("1", "Epic Orchestral", TrackCategory::Music, 180, "energetic"),
    ("2", "Ambient Chill", TrackCategory::Music, 240, "calm"),
    ("3", "Corporate Upbeat", TrackCategory::Music, 120, "positive"),
    ("4", "Applause", TrackCategory::Sfx, 5, "positive"),
    ("5", "Whoosh Transition", TrackCategory::Sfx, 2, "dynamic"),
    ("6", "Success Bell", TrackCategory::Sfx, 3, "positive"),
    ("7", "Documentary Voice", TrackCategory::Voice, 60, "neutral"),
    ("8", "Energetic Narrator", TrackCategory::Voice, 45, "energetic"),
];

/// Immutable audio library offered to the user.
#[derive(Debug, Clone)]
pub struct Catalog {
    tracks: Vec<TrackRef>,
}

impl Catalog {
    pub fn builtin() -> Self {
        let tracks = BUILTIN_TRACKS
            .iter()
            .map(|&(id, name, category, duration_secs, emotion)| {
                Arc::new(Track {
                    id: id.to_string(),
                    name: name.to_string(),
                    category,
                    duration_secs,
                    emotion: emotion.to_string(),
                })
            })
            .collect();
        Self { tracks }
    }

    pub fn get(&self, id: &str) -> Option<&TrackRef> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn by_category(&self, category: TrackCategory) -> impl Iterator<Item = &TrackRef> {
        self.tracks.iter().filter(move |t| t.category == category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackRef> {
        self.tracks.iter()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn builtin_catalog_has_unique_ids() {
        let catalog = Catalog::builtin();
        let ids: HashSet<_> = catalog.iter().map(|t| t.id.as_str()).collect();

        assert_eq!(catalog.len(), 8);
        assert_eq!(ids.len(), 8);
        assert!(catalog.iter().all(|t| t.duration_secs > 0));
    }

    #[test]
    fn lookup_unknown_id_is_none() {
        let catalog = Catalog::builtin();

        assert_eq!(catalog.get("3").map(|t| t.name.as_str()), Some("Corporate Upbeat"));
        assert!(catalog.get("42").is_none());
        assert!(catalog.get("").is_none());
    }

    #[test]
    fn category_filter_keeps_catalog_order() {
        let catalog = Catalog::builtin();
        let sfx: Vec<_> = catalog
            .by_category(TrackCategory::Sfx)
            .map(|t| t.name.as_str())
            .collect();

        assert_eq!(sfx, ["Applause", "Whoosh Transition", "Success Bell"]);
        assert_eq!(catalog.by_category(TrackCategory::Music).count(), 3);
        assert_eq!(catalog.by_category(TrackCategory::Voice).count(), 2);
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("SFX".parse::<TrackCategory>(), Ok(TrackCategory::Sfx));
        assert_eq!(" music ".parse::<TrackCategory>(), Ok(TrackCategory::Music));
        assert!("podcast".parse::<TrackCategory>().is_err());
    }
}
