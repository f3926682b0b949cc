use crate::types::TrackRef;

/// Tracks staged for export, unique by id and kept in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct SelectedTrackSet {
    tracks: Vec<TrackRef>,
}

impl SelectedTrackSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `track` unless a member already has its id. Returns whether the set changed.
    pub fn add(&mut self, track: TrackRef) -> bool {
        if self.contains(&track.id) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    /// Removes the member with `id`, if any.
    pub fn remove(&mut self, id: &str) -> Option<TrackRef> {
        let idx = self.tracks.iter().position(|t| t.id == id)?;
        Some(self.tracks.remove(idx))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tracks.iter().any(|t| t.id == id)
    }

    pub fn size(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn to_ordered_list(&self) -> Vec<TrackRef> {
        self.tracks.clone()
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.tracks.iter().map(|t| u64::from(t.duration_secs)).sum()
    }
}
