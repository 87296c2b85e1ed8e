//! The caller-facing result of a task

use crate::config::{Configuration, ConfigurationMessage};
use crate::frame::FrameDescriptor;
use crate::message::{AudioProperties, FieldListMap, FieldMap, TagFields};
use crate::snapshot::TagSnapshot;

use serde::{Deserialize, Serialize};

/// The response to a read or write request
///
/// Every optional key is present only if its group was readable, and the container holds it.
/// `configuration` is present only if the configuration asked to be echoed.
///
/// ```json
/// {
/// 	"path": "song.mp3",
/// 	"audioProperties": { "duration": 1000, "sampleRate": 44100, "channels": 2 },
/// 	"tag": { "title": "Foo title", "track": 1 },
/// 	"legacyTag": { "title": "Foo title", "track": 1 }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
	/// The file's path, or `file://` URL if absolute URLs were requested
	pub path: String,
	/// The effective configuration of the request
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub configuration: Option<ConfigurationMessage>,
	/// See [`TagGroup::AudioProperties`](crate::config::TagGroup::AudioProperties)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub audio_properties: Option<AudioProperties>,
	/// See [`TagGroup::Generic`](crate::config::TagGroup::Generic)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tag: Option<TagFields>,
	/// See [`TagGroup::Legacy`](crate::config::TagGroup::Legacy)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub legacy_tag: Option<TagFields>,
	/// See [`TagGroup::Frame`](crate::config::TagGroup::Frame)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub frame_tag: Option<Vec<FrameDescriptor>>,
	/// See [`TagGroup::CommentBlock`](crate::config::TagGroup::CommentBlock)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub comment_block: Option<FieldListMap>,
	/// See [`TagGroup::Supplementary`](crate::config::TagGroup::Supplementary)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub supplementary_tag: Option<FieldMap>,
}

impl Response {
	pub(crate) fn from_snapshot(snapshot: TagSnapshot, configuration: &Configuration) -> Self {
		let TagSnapshot {
			path,
			audio_properties,
			tag,
			legacy_tag,
			frame_tag,
			comment_block,
			supplementary_tag,
		} = snapshot;

		Self {
			path,
			configuration: configuration
				.echo_configuration
				.then(|| ConfigurationMessage::from(configuration)),
			audio_properties,
			tag,
			legacy_tag,
			frame_tag,
			comment_block,
			supplementary_tag,
		}
	}

	/// Serialize the response into its JSON message form
	///
	/// # Errors
	///
	/// See [`serde_json::to_value`]
	pub fn to_json(&self) -> crate::error::Result<serde_json::Value> {
		Ok(serde_json::to_value(self)?)
	}
}
