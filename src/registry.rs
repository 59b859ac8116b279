//! Segment registry.
//!
//! A [`SegmentRegistry`] is the static dataset definition: an ordered list
//! of [`Group`]s, each holding an ordered list of [`Segment`]s. It is built
//! once before a run and only ever read afterwards. Enumeration always
//! follows definition order so output naming is identical across runs.
//!
//! # Example
//!
//! ```
//! use framesift::{Group, Segment, SegmentRegistry};
//!
//! let registry = SegmentRegistry::new(vec![Group::new(
//!     "choice_box",
//!     "Choice Box samples",
//!     vec![Segment::new(594.0, 596.0, 15.0)?],
//! )?])?;
//!
//! assert_eq!(registry.all_segments().count(), 1);
//! # Ok::<(), framesift::FramesiftError>(())
//! ```

use std::collections::HashSet;

use crate::error::FramesiftError;

/// A time range of the source video sampled at a fixed rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    start_seconds: f64,
    end_seconds: f64,
    sample_rate_hz: f64,
}

impl Segment {
    /// Create a segment covering `[start_seconds, end_seconds)`.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::InvalidSegment`] unless all values are
    /// finite, `0 <= start_seconds < end_seconds`, and `sample_rate_hz > 0`.
    pub fn new(
        start_seconds: f64,
        end_seconds: f64,
        sample_rate_hz: f64,
    ) -> Result<Self, FramesiftError> {
        let invalid = |reason: &str| FramesiftError::InvalidSegment {
            start: start_seconds,
            end: end_seconds,
            rate: sample_rate_hz,
            reason: reason.to_string(),
        };

        if !(start_seconds.is_finite() && end_seconds.is_finite() && sample_rate_hz.is_finite()) {
            return Err(invalid("values must be finite"));
        }
        if start_seconds < 0.0 {
            return Err(invalid("start must not be negative"));
        }
        if start_seconds >= end_seconds {
            return Err(invalid("start must be before end"));
        }
        if sample_rate_hz <= 0.0 {
            return Err(invalid("sample rate must be positive"));
        }

        Ok(Self {
            start_seconds,
            end_seconds,
            sample_rate_hz,
        })
    }

    pub fn start_seconds(&self) -> f64 {
        self.start_seconds
    }

    pub fn end_seconds(&self) -> f64 {
        self.end_seconds
    }

    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

/// A named, independently numbered output set.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    name: String,
    description: String,
    segments: Vec<Segment>,
}

impl Group {
    /// Create a group.
    ///
    /// The name becomes both the output directory and the file prefix, so it
    /// must be a single non-empty path component.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::InvalidGroupName`] if `name` is empty,
    /// `.`/`..`, or contains a path separator.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        segments: Vec<Segment>,
    ) -> Result<Self, FramesiftError> {
        let name = name.into();
        let is_usable = !name.trim().is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        if !is_usable {
            return Err(FramesiftError::InvalidGroupName(name));
        }

        Ok(Self {
            name,
            description: description.into(),
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Segments in definition order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// The immutable, ordered collection of groups driving a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRegistry {
    groups: Vec<Group>,
}

impl SegmentRegistry {
    /// Build a registry from groups in definition order.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::DuplicateGroup`] if two groups share a name.
    pub fn new(groups: Vec<Group>) -> Result<Self, FramesiftError> {
        let mut seen = HashSet::new();
        for group in &groups {
            if !seen.insert(group.name()) {
                return Err(FramesiftError::DuplicateGroup(group.name().to_string()));
            }
        }
        Ok(Self { groups })
    }

    /// All groups in definition order.
    pub fn all_groups(&self) -> &[Group] {
        &self.groups
    }

    /// Every segment, group by group, preserving order within each group.
    pub fn all_segments(&self) -> impl Iterator<Item = &Segment> {
        self.groups.iter().flat_map(|group| group.segments.iter())
    }

    /// Look up a group by name.
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.name == name)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
