//! Field sets exchanged with callers
//!
//! These are the per-group value types found in both write requests and responses.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Vorbis comments, key → every value under that key, in order
pub type FieldListMap = BTreeMap<String, Vec<String>>;

/// APE items, key → value
pub type FieldMap = BTreeMap<String, String>;

/// The common fields of the generic and legacy tags
///
/// Unset fields are omitted from messages.
///
/// # Examples
///
/// ```rust
/// use tagio::message::TagFields;
///
/// let fields: TagFields = serde_json::from_str(r#"{ "artist": "A", "album": "B", "track": 1 }"#)?;
/// assert_eq!(fields.artist.as_deref(), Some("A"));
/// assert_eq!(fields.track, Some(1));
/// assert_eq!(fields.title, None);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagFields {
	/// Track title
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	/// Album title
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub album: Option<String>,
	/// Track artist
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub artist: Option<String>,
	/// Track number
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub track: Option<u32>,
	/// Recording year
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub year: Option<u32>,
	/// Genre name
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub genre: Option<String>,
	/// Comment
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub comment: Option<String>,
}

impl TagFields {
	/// Whether no field is set
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}

	/// Fill every unset field from `other`
	pub(crate) fn fill_from(&mut self, other: TagFields) {
		self.title = self.title.take().or(other.title);
		self.album = self.album.take().or(other.album);
		self.artist = self.artist.take().or(other.artist);
		self.track = self.track.or(other.track);
		self.year = self.year.or(other.year);
		self.genre = self.genre.take().or(other.genre);
		self.comment = self.comment.take().or(other.comment);
	}
}

/// The audio properties of a container
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioProperties {
	/// Duration in milliseconds
	pub duration: u64,
	/// Overall bitrate (kbps)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bitrate: Option<u32>,
	/// Audio bitrate (kbps)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub audio_bitrate: Option<u32>,
	/// Sample rate (Hz)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sample_rate: Option<u32>,
	/// Bits per sample
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bit_depth: Option<u8>,
	/// Channel count
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub channels: Option<u8>,
}

impl AudioProperties {
	/// The duration as a [`Duration`]
	pub fn duration(&self) -> Duration {
		Duration::from_millis(self.duration)
	}
}

impl From<lofty::properties::FileProperties> for AudioProperties {
	fn from(properties: lofty::properties::FileProperties) -> Self {
		Self {
			duration: properties.duration().as_millis() as u64,
			bitrate: properties.overall_bitrate(),
			audio_bitrate: properties.audio_bitrate(),
			sample_rate: properties.sample_rate(),
			bit_depth: properties.bit_depth(),
			channels: properties.channels(),
		}
	}
}
