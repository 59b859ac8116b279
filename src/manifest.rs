//! JSON segment manifests.
//!
//! A manifest is the on-disk form of a [`SegmentRegistry`], plus the
//! locator of the source video. Segment entries are three-element arrays
//! `[start, end, rate]`, where `start` and `end` are either timestamp
//! strings (see [`parse_time`](crate::parse_time)) or plain seconds.
//!
//! ```json
//! {
//!   "source": "https://youtu.be/R1-PWEqsS8c",
//!   "groups": [
//!     {
//!       "name": "choice_box",
//!       "description": "Choice Box samples",
//!       "segments": [["09:54", "09:56", 15]]
//!     }
//!   ]
//! }
//! ```
//!
//! Every timestamp is parsed in [`Manifest::into_registry`], so malformed
//! data is rejected before anything is fetched or opened.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::FramesiftError,
    registry::{Group, Segment, SegmentRegistry},
    timestamp::parse_time,
};

/// A segment boundary as written in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeSpec {
    /// Plain seconds, e.g. `90` or `5.5`.
    Seconds(f64),
    /// Timestamp notation, e.g. `"01:30"`.
    Text(String),
}

impl TimeSpec {
    /// Resolve to seconds.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::MalformedTimestamp`] for unparsable text or
    /// negative or non-finite numbers.
    pub fn to_seconds(&self) -> Result<f64, FramesiftError> {
        match self {
            TimeSpec::Text(text) => parse_time(text),
            TimeSpec::Seconds(seconds) if seconds.is_finite() && *seconds >= 0.0 => Ok(*seconds),
            TimeSpec::Seconds(seconds) => Err(FramesiftError::MalformedTimestamp {
                input: seconds.to_string(),
                reason: "seconds must be finite and non-negative".to_string(),
            }),
        }
    }
}

/// One `[start, end, rate]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpec(pub TimeSpec, pub TimeSpec, pub f64);

/// One group entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub segments: Vec<SegmentSpec>,
}

/// A parsed, not yet validated, manifest document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Locator handed to the fetcher when the video is not yet local.
    #[serde(default)]
    pub source: Option<String>,
    pub groups: Vec<GroupSpec>,
}

impl Manifest {
    /// Parse a manifest from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::ManifestError`] if the JSON is malformed or
    /// does not match the manifest shape.
    pub fn from_json_str(json: &str) -> Result<Self, FramesiftError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::ManifestError`] if the file cannot be read
    /// or parsed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FramesiftError> {
        let path = path.as_ref();
        log::debug!("Loading segment manifest: {}", path.display());

        let json = fs::read_to_string(path).map_err(|error| {
            FramesiftError::ManifestError(format!("cannot read {}: {error}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// Validate every entry and build the registry.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error encountered:
    /// [`FramesiftError::MalformedTimestamp`],
    /// [`FramesiftError::InvalidSegment`],
    /// [`FramesiftError::InvalidGroupName`], or
    /// [`FramesiftError::DuplicateGroup`].
    pub fn to_registry(&self) -> Result<SegmentRegistry, FramesiftError> {
        let groups = self
            .groups
            .iter()
            .map(|group| {
                Group::new(
                    group.name.clone(),
                    group.description.clone(),
                    resolve_segments(&group.segments)?,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        SegmentRegistry::new(groups)
    }

    /// Consuming form of [`to_registry`](Manifest::to_registry). Group names
    /// and descriptions are moved into the registry.
    ///
    /// # Errors
    ///
    /// Same as [`to_registry`](Manifest::to_registry).
    pub fn into_registry(self) -> Result<SegmentRegistry, FramesiftError> {
        let groups = self
            .groups
            .into_iter()
            .map(|group| {
                let segments = resolve_segments(&group.segments)?;
                Group::new(group.name, group.description, segments)
            })
            .collect::<Result<Vec<_>, _>>()?;

        SegmentRegistry::new(groups)
    }
}

fn resolve_segments(specs: &[SegmentSpec]) -> Result<Vec<Segment>, FramesiftError> {
    specs
        .iter()
        .map(|SegmentSpec(start, end, rate)| {
            Segment::new(start.to_seconds()?, end.to_seconds()?, *rate)
        })
        .collect()
}
