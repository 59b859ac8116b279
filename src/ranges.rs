//! Download range aggregation.
//!
//! The fetcher only needs to make the configured segments available
//! locally. [`compute_download_ranges`] translates every segment of a
//! registry into a [`DownloadRange`], one to one and in flattened order.
//! Overlapping or duplicate ranges are passed through untouched; the
//! fetcher performs its own keyframe-aligned merging.

use serde::Serialize;

use crate::registry::SegmentRegistry;

/// A `[start, end)` span of the source, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DownloadRange {
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl DownloadRange {
    /// Render as a `yt-dlp --download-sections` time spec, e.g. `*5-6`.
    pub fn to_section_spec(&self) -> String {
        format!("*{}-{}", self.start_seconds, self.end_seconds)
    }
}

/// One range per segment, group by group, in definition order.
pub fn compute_download_ranges(registry: &SegmentRegistry) -> Vec<DownloadRange> {
    registry
        .all_segments()
        .map(|segment| DownloadRange {
            start_seconds: segment.start_seconds(),
            end_seconds: segment.end_seconds(),
        })
        .collect()
}
