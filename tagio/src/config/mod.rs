//! Per-request policy
//!
//! A [`Configuration`] decides which [`TagGroup`]s a task may read and write, which ID3v2
//! version frames are emitted as, and how binary payloads are referenced in responses.
//! It is built once per request and threaded through every operation of that request.

mod message;

pub use message::{ConfigurationMessage, EchoFlag, GroupFlags};

use crate::error::Result;
use crate::macros::invalid_arg;

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use lofty::config::WriteOptions;
use serde::{Deserialize, Serialize};

/// A named category of metadata, independently gated for reading and writing
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagGroup {
	/// The generic title/artist/album view over whichever tags a container holds
	Generic,
	/// Duration, bitrate, sample rate, etc. Read only.
	AudioProperties,
	/// The fixed-layout ID3v1 tag
	Legacy,
	/// The frame-based ID3v2 tag
	Frame,
	/// Free-form Vorbis comments
	CommentBlock,
	/// APEv2 key/value items
	Supplementary,
}

impl TagGroup {
	/// Every group, in message order
	pub const ALL: [TagGroup; 6] = [
		TagGroup::Generic,
		TagGroup::AudioProperties,
		TagGroup::Legacy,
		TagGroup::Frame,
		TagGroup::CommentBlock,
		TagGroup::Supplementary,
	];

	/// The key this group is stored under in request and response messages
	///
	/// # Examples
	///
	/// ```rust
	/// use tagio::config::TagGroup;
	///
	/// assert_eq!(TagGroup::Frame.key(), "frameTag");
	/// ```
	pub const fn key(self) -> &'static str {
		match self {
			TagGroup::Generic => "tag",
			TagGroup::AudioProperties => "audioProperties",
			TagGroup::Legacy => "legacyTag",
			TagGroup::Frame => "frameTag",
			TagGroup::CommentBlock => "commentBlock",
			TagGroup::Supplementary => "supplementaryTag",
		}
	}

	const fn index(self) -> usize {
		self as usize
	}
}

impl Display for TagGroup {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.key())
	}
}

/// Read/write flags for a single [`TagGroup`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GroupAccess {
	/// Whether the group is exported into responses
	pub readable: bool,
	/// Whether the group is imported from write requests
	pub writable: bool,
}

impl GroupAccess {
	/// Both reading and writing enabled
	pub const ENABLED: Self = Self {
		readable: true,
		writable: true,
	};

	/// Only reading enabled
	pub const READ_ONLY: Self = Self {
		readable: true,
		writable: false,
	};

	/// Neither reading nor writing enabled
	pub const DISABLED: Self = Self {
		readable: false,
		writable: false,
	};
}

impl Default for GroupAccess {
	fn default() -> Self {
		Configuration::DEFAULT_GROUP_ACCESS
	}
}

/// The ID3v2 version frames are rendered and persisted as
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FrameVersion {
	/// ID3v2.3
	V3,
	/// ID3v2.4
	#[default]
	V4,
}

impl FrameVersion {
	/// Get a `FrameVersion` from its minor version number
	///
	/// Only `3` and `4` are supported.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagio::config::FrameVersion;
	///
	/// assert_eq!(FrameVersion::from_number(3), Some(FrameVersion::V3));
	/// assert_eq!(FrameVersion::from_number(2), None);
	/// ```
	pub const fn from_number(number: u8) -> Option<Self> {
		match number {
			3 => Some(FrameVersion::V3),
			4 => Some(FrameVersion::V4),
			_ => None,
		}
	}

	/// The minor version number
	pub const fn number(self) -> u8 {
		match self {
			FrameVersion::V3 => 3,
			FrameVersion::V4 => 4,
		}
	}

	pub(crate) fn write_options(self) -> WriteOptions {
		WriteOptions::new().use_id3v23(self == FrameVersion::V3)
	}
}

/// How binary frame payloads are represented in responses
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BinaryPayloadMode {
	/// Payloads are base64 encoded into the response
	#[default]
	Inline,
	/// Payloads are written to [`Configuration::payload_directory`] and referenced by locator
	ExternalLocator,
}

/// How the legacy tag is rebuilt on write
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LegacyWriteMode {
	/// Start from a blank tag, fields absent from the request are cleared
	#[default]
	Replace,
	/// Start from the existing tag, fields absent from the request are kept
	Merge,
}

/// Options to control what a task reads and writes
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Configuration {
	pub(crate) groups: [GroupAccess; 6],
	pub(crate) frame_version: FrameVersion,
	pub(crate) binary_payload_mode: BinaryPayloadMode,
	pub(crate) payload_directory: Option<PathBuf>,
	pub(crate) absolute_urls: bool,
	pub(crate) legacy_write_mode: LegacyWriteMode,
	pub(crate) echo_configuration: bool,
}

impl Default for Configuration {
	/// The default implementation for `Configuration`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// Configuration {
	/// 	groups: [GroupAccess::ENABLED; 6],
	/// 	frame_version: FrameVersion::V4,
	/// 	binary_payload_mode: BinaryPayloadMode::Inline,
	/// 	payload_directory: None,
	/// 	absolute_urls: false,
	/// 	legacy_write_mode: LegacyWriteMode::Replace,
	/// 	echo_configuration: false,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}

impl Configuration {
	/// Default access for every group
	pub const DEFAULT_GROUP_ACCESS: GroupAccess = GroupAccess::ENABLED;

	/// Default frame version
	pub const DEFAULT_FRAME_VERSION: FrameVersion = FrameVersion::V4;

	/// Default binary payload mode
	pub const DEFAULT_BINARY_PAYLOAD_MODE: BinaryPayloadMode = BinaryPayloadMode::Inline;

	/// Default legacy write mode
	pub const DEFAULT_LEGACY_WRITE_MODE: LegacyWriteMode = LegacyWriteMode::Replace;

	/// Creates a new `Configuration`, alias for `Default` implementation
	///
	/// See also: [`Configuration::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagio::config::Configuration;
	///
	/// let configuration = Configuration::new();
	/// ```
	#[must_use]
	pub const fn new() -> Self {
		Self {
			groups: [Self::DEFAULT_GROUP_ACCESS; 6],
			frame_version: Self::DEFAULT_FRAME_VERSION,
			binary_payload_mode: Self::DEFAULT_BINARY_PAYLOAD_MODE,
			payload_directory: None,
			absolute_urls: false,
			legacy_write_mode: Self::DEFAULT_LEGACY_WRITE_MODE,
			echo_configuration: false,
		}
	}

	/// Set both flags of a group
	///
	/// # Examples
	///
	/// ```rust
	/// use tagio::config::{Configuration, GroupAccess, TagGroup};
	///
	/// // Never touch the legacy tag
	/// let configuration = Configuration::new().group(TagGroup::Legacy, GroupAccess::DISABLED);
	/// assert!(!configuration.is_readable(TagGroup::Legacy));
	/// ```
	pub fn group(mut self, group: TagGroup, access: GroupAccess) -> Self {
		self.groups[group.index()] = access;
		self
	}

	/// Whether a group is exported into responses
	pub fn readable(mut self, group: TagGroup, readable: bool) -> Self {
		self.groups[group.index()].readable = readable;
		self
	}

	/// Whether a group is imported from write requests
	pub fn writable(mut self, group: TagGroup, writable: bool) -> Self {
		self.groups[group.index()].writable = writable;
		self
	}

	/// Set every group at once
	///
	/// # Examples
	///
	/// ```rust
	/// use tagio::config::{Configuration, GroupAccess, TagGroup};
	///
	/// // Only read the frame tag
	/// let configuration = Configuration::new()
	/// 	.all_groups(GroupAccess::DISABLED)
	/// 	.readable(TagGroup::Frame, true);
	/// ```
	pub fn all_groups(mut self, access: GroupAccess) -> Self {
		self.groups = [access; 6];
		self
	}

	/// The ID3v2 version to render and persist frames as
	pub fn frame_version(mut self, frame_version: FrameVersion) -> Self {
		self.frame_version = frame_version;
		self
	}

	/// How binary payloads are represented in responses
	pub fn binary_payload_mode(mut self, binary_payload_mode: BinaryPayloadMode) -> Self {
		self.binary_payload_mode = binary_payload_mode;
		self
	}

	/// The directory externally referenced payloads are written to
	///
	/// This is required when using [`BinaryPayloadMode::ExternalLocator`] with a readable
	/// [`TagGroup::Frame`].
	///
	/// The directory may be shared between sources. File names carry the source's stem and a
	/// hash of its absolute path, so only re-reading the same source replaces earlier payloads.
	pub fn payload_directory(mut self, payload_directory: impl Into<PathBuf>) -> Self {
		self.payload_directory = Some(payload_directory.into());
		self
	}

	/// Whether locators and the response path are `file://` URLs
	pub fn absolute_urls(mut self, absolute_urls: bool) -> Self {
		self.absolute_urls = absolute_urls;
		self
	}

	/// How the legacy tag is rebuilt on write
	pub fn legacy_write_mode(mut self, legacy_write_mode: LegacyWriteMode) -> Self {
		self.legacy_write_mode = legacy_write_mode;
		self
	}

	/// Whether the response echoes this configuration back
	pub fn echo_configuration(mut self, echo_configuration: bool) -> Self {
		self.echo_configuration = echo_configuration;
		self
	}

	/// The flags of a group
	pub fn access(&self, group: TagGroup) -> GroupAccess {
		self.groups[group.index()]
	}

	/// Whether `group` is exported into responses
	pub fn is_readable(&self, group: TagGroup) -> bool {
		self.access(group).readable
	}

	/// Whether `group` is imported from write requests
	///
	/// Audio properties are never writable, regardless of their flags.
	pub fn is_writable(&self, group: TagGroup) -> bool {
		group != TagGroup::AudioProperties && self.access(group).writable
	}

	/// The directory externally referenced payloads are written to
	pub fn get_payload_directory(&self) -> Option<&Path> {
		self.payload_directory.as_deref()
	}

	/// Verify the options are usable together
	///
	/// # Errors
	///
	/// * [`BinaryPayloadMode::ExternalLocator`] is used with a readable frame group, but no
	///   payload directory was provided
	pub fn validate(&self) -> Result<()> {
		if self.binary_payload_mode == BinaryPayloadMode::ExternalLocator
			&& self.is_readable(TagGroup::Frame)
			&& self.payload_directory.is_none()
		{
			invalid_arg!(@BAIL "`externalLocator` payloads require a `payloadDirectory`");
		}

		Ok(())
	}
}
