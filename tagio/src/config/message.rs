use super::{
	BinaryPayloadMode, Configuration, FrameVersion, GroupAccess, LegacyWriteMode, TagGroup,
};
use crate::error::{Result, TagIoError};
use crate::macros::invalid_arg;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Optional `{ readable, writable }` flags for one group
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupFlags {
	/// Whether the group is exported into responses
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub readable: Option<bool>,
	/// Whether the group is imported from write requests
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub writable: Option<bool>,
}

impl GroupFlags {
	fn apply(self, access: GroupAccess) -> GroupAccess {
		GroupAccess {
			readable: self.readable.unwrap_or(access.readable),
			writable: self.writable.unwrap_or(access.writable),
		}
	}
}

impl From<GroupAccess> for GroupFlags {
	fn from(access: GroupAccess) -> Self {
		Self {
			readable: Some(access.readable),
			writable: Some(access.writable),
		}
	}
}

/// The `configuration: { readable }` entry, deciding whether a response echoes its configuration
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EchoFlag {
	/// Whether the response carries a `configuration` key
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub readable: Option<bool>,
}

/// The message form of a [`Configuration`]
///
/// Every field is optional, omitted fields take the defaults of [`Configuration::new`].
///
/// ```json
/// {
/// 	"tag": { "readable": true, "writable": true },
/// 	"legacyTag": { "readable": false },
/// 	"frameVersion": 3,
/// 	"binaryPayloadMode": "externalLocator",
/// 	"payloadDirectory": "/tmp/covers"
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigurationMessage {
	/// Flags for [`TagGroup::Generic`]
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tag: Option<GroupFlags>,
	/// Flags for [`TagGroup::AudioProperties`]
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub audio_properties: Option<GroupFlags>,
	/// Flags for [`TagGroup::Legacy`]
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub legacy_tag: Option<GroupFlags>,
	/// Flags for [`TagGroup::Frame`]
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub frame_tag: Option<GroupFlags>,
	/// Flags for [`TagGroup::CommentBlock`]
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub comment_block: Option<GroupFlags>,
	/// Flags for [`TagGroup::Supplementary`]
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub supplementary_tag: Option<GroupFlags>,
	/// Whether the response echoes the configuration
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub configuration: Option<EchoFlag>,
	/// `3` or `4`
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub frame_version: Option<u8>,
	/// See [`BinaryPayloadMode`]
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub binary_payload_mode: Option<BinaryPayloadMode>,
	/// See [`Configuration::payload_directory`]
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub payload_directory: Option<PathBuf>,
	/// See [`Configuration::absolute_urls`]
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub absolute_urls: Option<bool>,
	/// See [`LegacyWriteMode`]
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub legacy_write_mode: Option<LegacyWriteMode>,
}

impl ConfigurationMessage {
	fn flags(&self, group: TagGroup) -> Option<GroupFlags> {
		match group {
			TagGroup::Generic => self.tag,
			TagGroup::AudioProperties => self.audio_properties,
			TagGroup::Legacy => self.legacy_tag,
			TagGroup::Frame => self.frame_tag,
			TagGroup::CommentBlock => self.comment_block,
			TagGroup::Supplementary => self.supplementary_tag,
		}
	}
}

impl TryFrom<ConfigurationMessage> for Configuration {
	type Error = TagIoError;

	fn try_from(message: ConfigurationMessage) -> Result<Self> {
		let mut configuration = Configuration::new();

		for group in TagGroup::ALL {
			if let Some(flags) = message.flags(group) {
				let access = flags.apply(configuration.access(group));
				configuration = configuration.group(group, access);
			}
		}

		if let Some(number) = message.frame_version {
			let Some(frame_version) = FrameVersion::from_number(number) else {
				invalid_arg!(@BAIL "unsupported `frameVersion` {number}, expected 3 or 4");
			};

			configuration = configuration.frame_version(frame_version);
		}

		if let Some(mode) = message.binary_payload_mode {
			configuration = configuration.binary_payload_mode(mode);
		}

		if let Some(directory) = message.payload_directory {
			configuration = configuration.payload_directory(directory);
		}

		if let Some(absolute_urls) = message.absolute_urls {
			configuration = configuration.absolute_urls(absolute_urls);
		}

		if let Some(mode) = message.legacy_write_mode {
			configuration = configuration.legacy_write_mode(mode);
		}

		if let Some(EchoFlag {
			readable: Some(echo),
		}) = message.configuration
		{
			configuration = configuration.echo_configuration(echo);
		}

		configuration.validate()?;
		Ok(configuration)
	}
}

impl From<&Configuration> for ConfigurationMessage {
	fn from(configuration: &Configuration) -> Self {
		let flags = |group| Some(GroupFlags::from(configuration.access(group)));

		Self {
			tag: flags(TagGroup::Generic),
			audio_properties: flags(TagGroup::AudioProperties),
			legacy_tag: flags(TagGroup::Legacy),
			frame_tag: flags(TagGroup::Frame),
			comment_block: flags(TagGroup::CommentBlock),
			supplementary_tag: flags(TagGroup::Supplementary),
			configuration: Some(EchoFlag {
				readable: Some(configuration.echo_configuration),
			}),
			frame_version: Some(configuration.frame_version.number()),
			binary_payload_mode: Some(configuration.binary_payload_mode),
			payload_directory: configuration.payload_directory.clone(),
			absolute_urls: Some(configuration.absolute_urls),
			legacy_write_mode: Some(configuration.legacy_write_mode),
		}
	}
}
