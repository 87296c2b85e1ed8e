//! Read and write requests
//!
//! Requests are fully validated on construction. Anything that can be checked without touching
//! the file is checked here, and reported as [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
//! before the request ever reaches the scheduler.

use crate::config::{Configuration, ConfigurationMessage, TagGroup};
use crate::error::Result;
use crate::frame::{FrameDescriptor, Payload};
use crate::handle::{BinaryHandle, BinaryHandleMap, ResourceLocator};
use crate::macros::invalid_arg;
use crate::message::{FieldListMap, FieldMap, TagFields};

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const MAX_LEGACY_TRACK: u32 = 255;
const MAX_YEAR: u32 = 9999;

const APE_KEY_LENGTH: std::ops::RangeInclusive<usize> = 2..=255;
const APE_RESERVED_KEYS: [&str; 4] = ["ID3", "TAG", "OGGS", "MP+"];

/// The message form of a [`ReadRequest`]
///
/// ```json
/// { "path": "song.mp3", "configuration": { "legacyTag": { "readable": false } } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadMessage {
	/// The file to read
	pub path: String,
	/// The request's configuration, the defaults are used if omitted
	#[serde(default)]
	pub configuration: ConfigurationMessage,
}

/// The message form of a [`WriteRequest`]
///
/// ```json
/// {
/// 	"path": "song.mp3",
/// 	"tag": { "title": "Foo title" },
/// 	"frameTag": [
/// 		{ "kind": "picture", "pictureType": 3, "mimeType": "image/png", "payload": { "handle": 0 } }
/// 	],
/// 	"resources": { "0": "file:///covers/front.png" }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WriteMessage {
	/// The file to write
	pub path: String,
	/// The request's configuration, the defaults are used if omitted
	#[serde(default)]
	pub configuration: ConfigurationMessage,
	/// The generic tag fields to write
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tag: Option<TagFields>,
	/// The legacy tag fields to write
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub legacy_tag: Option<TagFields>,
	/// The frames to write
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub frame_tag: Option<Vec<FrameDescriptor>>,
	/// The Vorbis comments to write
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub comment_block: Option<FieldListMap>,
	/// The APE items to write
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub supplementary_tag: Option<FieldMap>,
	/// The locators of every caller-assigned [`BinaryHandle`]
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub resources: BTreeMap<BinaryHandle, String>,
}

/// A request to read a file's metadata
#[derive(Clone, Debug)]
pub struct ReadRequest {
	pub(crate) path: PathBuf,
	pub(crate) configuration: Configuration,
}

impl ReadRequest {
	/// Create a `ReadRequest`
	///
	/// # Errors
	///
	/// * `path` is empty
	/// * See [`Configuration::validate`]
	pub fn new(path: impl Into<PathBuf>, configuration: Configuration) -> Result<Self> {
		let path = path.into();
		validate_path(&path)?;
		configuration.validate()?;

		Ok(Self {
			path,
			configuration,
		})
	}

	/// Create a `ReadRequest` from its message form
	///
	/// # Errors
	///
	/// See [`ReadRequest::new`] and [`Configuration::try_from`]
	pub fn from_message(message: ReadMessage) -> Result<Self> {
		let configuration = Configuration::try_from(message.configuration)?;
		Self::new(message.path, configuration)
	}

	/// Parse a `ReadRequest` from a JSON message
	///
	/// # Errors
	///
	/// * `json` is not a valid [`ReadMessage`]
	/// * See [`ReadRequest::from_message`]
	pub fn from_json(json: &str) -> Result<Self> {
		Self::from_message(serde_json::from_str(json)?)
	}

	/// The file to read
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// The request's configuration
	pub fn configuration(&self) -> &Configuration {
		&self.configuration
	}
}

/// The per-group changes of a write
///
/// `None` groups are left alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagMutation {
	/// See [`TagGroup::Generic`]
	pub tag: Option<TagFields>,
	/// See [`TagGroup::Legacy`]
	pub legacy_tag: Option<TagFields>,
	/// See [`TagGroup::Frame`]
	pub frame_tag: Option<Vec<FrameDescriptor>>,
	/// See [`TagGroup::CommentBlock`]
	pub comment_block: Option<FieldListMap>,
	/// See [`TagGroup::Supplementary`]
	pub supplementary_tag: Option<FieldMap>,
}

impl TagMutation {
	/// Whether no group is present
	pub fn is_empty(&self) -> bool {
		self.tag.is_none()
			&& self.legacy_tag.is_none()
			&& self.frame_tag.is_none()
			&& self.comment_block.is_none()
			&& self.supplementary_tag.is_none()
	}

	/// Whether `group` is present
	pub fn contains(&self, group: TagGroup) -> bool {
		match group {
			TagGroup::Generic => self.tag.is_some(),
			TagGroup::AudioProperties => false,
			TagGroup::Legacy => self.legacy_tag.is_some(),
			TagGroup::Frame => self.frame_tag.is_some(),
			TagGroup::CommentBlock => self.comment_block.is_some(),
			TagGroup::Supplementary => self.supplementary_tag.is_some(),
		}
	}

	fn remove(&mut self, group: TagGroup) {
		match group {
			TagGroup::Generic => self.tag = None,
			TagGroup::AudioProperties => {},
			TagGroup::Legacy => self.legacy_tag = None,
			TagGroup::Frame => self.frame_tag = None,
			TagGroup::CommentBlock => self.comment_block = None,
			TagGroup::Supplementary => self.supplementary_tag = None,
		}
	}

	fn retain_writable(&mut self, configuration: &Configuration) {
		for group in TagGroup::ALL {
			if self.contains(group) && !configuration.is_writable(group) {
				log::debug!("Ignoring {group}, it is not writable");
				self.remove(group);
			}
		}
	}

	fn validate(&self) -> Result<()> {
		if let Some(fields) = &self.tag {
			validate_year(fields, TagGroup::Generic)?;
		}

		if let Some(fields) = &self.legacy_tag {
			validate_year(fields, TagGroup::Legacy)?;

			if let Some(track) = fields.track {
				if !(1..=MAX_LEGACY_TRACK).contains(&track) {
					invalid_arg!(@BAIL "{}: track {track} is out of range 1..={MAX_LEGACY_TRACK}", TagGroup::Legacy);
				}
			}
		}

		if let Some(frames) = &self.frame_tag {
			for frame in frames {
				frame.validate()?;
			}
		}

		if let Some(fields) = &self.comment_block {
			for key in fields.keys() {
				if !valid_comment_key(key) {
					invalid_arg!(@BAIL "{}: invalid key `{key}`", TagGroup::CommentBlock);
				}
			}
		}

		if let Some(fields) = &self.supplementary_tag {
			for key in fields.keys() {
				if !valid_ape_key(key) {
					invalid_arg!(@BAIL "{}: invalid key `{key}`", TagGroup::Supplementary);
				}
			}
		}

		Ok(())
	}
}

/// A request to change a file's metadata
///
/// Once written, the file is read back, so a write produces the same [`Response`](crate::response::Response)
/// as a read issued right after it.
#[derive(Clone, Debug)]
pub struct WriteRequest {
	pub(crate) path: PathBuf,
	pub(crate) configuration: Configuration,
	pub(crate) mutation: TagMutation,
	pub(crate) handles: BinaryHandleMap,
}

impl WriteRequest {
	/// Create a `WriteRequest` with no caller-assigned handles
	///
	/// # Errors
	///
	/// See [`WriteRequest::with_resources`]
	pub fn new(
		path: impl Into<PathBuf>,
		configuration: Configuration,
		mutation: TagMutation,
	) -> Result<Self> {
		Self::with_resources(path, configuration, mutation, BinaryHandleMap::new())
	}

	/// Create a `WriteRequest`
	///
	/// Groups that are not writable under `configuration` are dropped. Every `locator` payload is
	/// registered into `resources`, and replaced by its new handle.
	///
	/// # Errors
	///
	/// * `path` is empty
	/// * See [`Configuration::validate`]
	/// * A field is out of range, or a key is invalid for its group
	/// * See [`FrameDescriptor::validate`]
	/// * A handle is referenced by more than one frame
	/// * A `locator` payload is not a valid [`ResourceLocator`]
	/// * No handle is left to generate for a `locator` payload
	pub fn with_resources(
		path: impl Into<PathBuf>,
		configuration: Configuration,
		mut mutation: TagMutation,
		mut resources: BinaryHandleMap,
	) -> Result<Self> {
		let path = path.into();
		validate_path(&path)?;
		configuration.validate()?;

		mutation.retain_writable(&configuration);
		mutation.validate()?;

		if let Some(frames) = &mut mutation.frame_tag {
			bind_payloads(frames, &mut resources)?;
		}

		Ok(Self {
			path,
			configuration,
			mutation,
			handles: resources,
		})
	}

	/// Create a `WriteRequest` from its message form
	///
	/// # Errors
	///
	/// * A handle appears twice in `resources`, or its locator is invalid
	/// * See [`WriteRequest::with_resources`] and [`Configuration::try_from`]
	pub fn from_message(message: WriteMessage) -> Result<Self> {
		let WriteMessage {
			path,
			configuration,
			tag,
			legacy_tag,
			frame_tag,
			comment_block,
			supplementary_tag,
			resources,
		} = message;

		let configuration = Configuration::try_from(configuration)?;

		let mut handles = BinaryHandleMap::new();
		for (handle, locator) in resources {
			handles.insert(handle, ResourceLocator::parse(&locator)?)?;
		}

		let mutation = TagMutation {
			tag,
			legacy_tag,
			frame_tag,
			comment_block,
			supplementary_tag,
		};

		Self::with_resources(path, configuration, mutation, handles)
	}

	/// Parse a `WriteRequest` from a JSON message
	///
	/// # Errors
	///
	/// * `json` is not a valid [`WriteMessage`]
	/// * See [`WriteRequest::from_message`]
	pub fn from_json(json: &str) -> Result<Self> {
		Self::from_message(serde_json::from_str(json)?)
	}

	/// The file to write
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// The request's configuration
	pub fn configuration(&self) -> &Configuration {
		&self.configuration
	}

	/// The changes to apply, limited to writable groups
	pub fn mutation(&self) -> &TagMutation {
		&self.mutation
	}

	/// The request's handle table
	pub fn handles(&self) -> &BinaryHandleMap {
		&self.handles
	}
}

// Every handle may back a single frame, and every locator payload becomes a handle
fn bind_payloads(frames: &mut [FrameDescriptor], handles: &mut BinaryHandleMap) -> Result<()> {
	let mut referenced = BTreeSet::new();
	for frame in frames.iter() {
		if let Some(Payload::Handle(handle)) = frame.payload() {
			if !referenced.insert(*handle) {
				invalid_arg!(@BAIL "binary handle {handle} is referenced by more than one frame");
			}

			handles.reserve(*handle);
		}
	}

	for frame in frames {
		let Some(Payload::Locator(locator)) = frame.payload() else {
			continue;
		};

		let handle = handles.register(ResourceLocator::parse(locator)?)?;
		log::trace!("Registered `{locator}` as binary handle {handle}");

		if let Some(payload) = frame.payload_mut() {
			*payload = Payload::Handle(handle);
		}
	}

	Ok(())
}

fn validate_path(path: &Path) -> Result<()> {
	if path.as_os_str().is_empty() {
		invalid_arg!(@BAIL "`path` must not be empty");
	}

	Ok(())
}

fn validate_year(fields: &TagFields, group: TagGroup) -> Result<()> {
	if let Some(year) = fields.year {
		if year > MAX_YEAR {
			invalid_arg!(@BAIL "{group}: year {year} is out of range 0..={MAX_YEAR}");
		}
	}

	Ok(())
}

// ASCII 0x20 through 0x7D, excluding '='
fn valid_comment_key(key: &str) -> bool {
	!key.is_empty() && key.bytes().all(|b| (0x20..=0x7D).contains(&b) && b != b'=')
}

fn valid_ape_key(key: &str) -> bool {
	APE_KEY_LENGTH.contains(&key.len())
		&& key.bytes().all(|b| (0x20..=0x7E).contains(&b))
		&& !APE_RESERVED_KEYS.contains(&key.to_ascii_uppercase().as_str())
}
