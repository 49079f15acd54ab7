use crate::models::Candidate;

/// A candidate that passed filtering and is guaranteed to carry an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilteredCandidate {
    pub pano_id: String,
}

impl FilteredCandidate {
    pub fn new(pano_id: impl Into<String>) -> Self {
        Self {
            pano_id: pano_id.into(),
        }
    }
}

/// Keep only panoramas that still need their image dimensions looked up.
///
/// Order is preserved. Entries without an id or with both dimensions
/// already known are dropped without trace.
pub fn filter_candidates(candidates: Vec<Candidate>) -> Vec<FilteredCandidate> {
    let total = candidates.len();
    let filtered: Vec<FilteredCandidate> = candidates
        .into_iter()
        .filter(Candidate::needs_enrichment)
        .filter_map(|c| c.pano_id.map(FilteredCandidate::new))
        .collect();

    tracing::info!(
        total,
        retained = filtered.len(),
        dropped = total - filtered.len(),
        "Filtered panoramas needing metadata"
    );
    filtered
}

/// Contiguous, positional partition of a slice into chunks of bounded size.
///
/// Chunks are produced lazily. The last one may be shorter.
#[derive(Debug, Clone, Copy)]
pub struct ChunkPlan<'a, T> {
    items: &'a [T],
    chunk_size: usize,
}

impl<'a, T> ChunkPlan<'a, T> {
    /// `chunk_size` is clamped to at least 1.
    pub fn new(items: &'a [T], chunk_size: usize) -> Self {
        Self {
            items,
            chunk_size: chunk_size.max(1),
        }
    }

    /// `ceil(len / chunk_size)`, zero for an empty input.
    pub fn chunk_count(&self) -> usize {
        self.items.len().div_ceil(self.chunk_size)
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.chunk_count()
    }

    pub fn chunks(&self) -> std::slice::Chunks<'a, T> {
        self.items.chunks(self.chunk_size)
    }
}
