use crate::core::coordinator::TrackId;

#[derive(Clone, Debug, PartialEq)]
pub struct TrackEntry {
    pub track: TrackId,
    /// Optional muted looping overlay synchronized to the track.
    pub video: Option<String>,
}

/// Ordered tracks of one player widget and the current selection.
#[derive(Clone, Debug, Default)]
pub struct Playlist {
    entries: Vec<TrackEntry>,
    current: usize,
}

impl Playlist {
    pub fn new(first: TrackEntry) -> Self {
        Self {
            entries: vec![first],
            current: 0,
        }
    }

    pub fn push(&mut self, entry: TrackEntry) {
        if !self.entries.iter().any(|e| e.track == entry.track) {
            self.entries.push(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current(&self) -> Option<&TrackEntry> {
        self.entries.get(self.current)
    }

    pub fn entry(&self, index: usize) -> Option<&TrackEntry> {
        self.entries.get(index)
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn has_next(&self) -> bool {
        self.current + 1 < self.entries.len()
    }

    pub fn has_previous(&self) -> bool {
        self.current > 0
    }

    pub fn select(&mut self, index: usize) -> Option<&TrackEntry> {
        if index >= self.entries.len() {
            return None;
        }
        self.current = index;
        self.current()
    }

    pub fn position_of(&self, track: &TrackId) -> Option<usize> {
        self.entries.iter().position(|e| &e.track == track)
    }

    pub fn next(&mut self) -> Option<&TrackEntry> {
        if !self.has_next() {
            return None;
        }
        self.select(self.current + 1)
    }

    pub fn previous(&mut self) -> Option<&TrackEntry> {
        if !self.has_previous() {
            return None;
        }
        self.select(self.current - 1)
    }

    /// Track end: advance, wrapping to the first entry.
    pub fn advance_wrapping(&mut self) -> Option<&TrackEntry> {
        if self.entries.is_empty() {
            return None;
        }
        self.select((self.current + 1) % self.entries.len())
    }
}
