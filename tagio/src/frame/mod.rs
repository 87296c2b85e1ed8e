//! Frame descriptors and the frame rewrite protocol
//!
//! A [`FrameDescriptor`] is the message form of a single ID3v2 frame. Each variant states
//! up front whether it carries a binary [`Payload`], so binary-carrying frames are known
//! without inspecting the frame at runtime.

mod build;
mod export;
mod normalize;
pub(crate) mod rewrite;

pub(crate) use export::export_frames;

use crate::error::Result;
use crate::handle::BinaryHandle;
use crate::macros::invalid_arg;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// The highest defined APIC picture type ("Publisher/Studio logotype")
const MAX_PICTURE_TYPE: u8 = 20;

/// The binary content of a frame
///
/// On import, any of the three forms is accepted. On export, the configured
/// [`BinaryPayloadMode`](crate::config::BinaryPayloadMode) decides between
/// [`Payload::Data`] and [`Payload::Locator`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Payload {
	/// The bytes themselves, base64 encoded in messages
	Data(#[serde(with = "base64")] Vec<u8>),
	/// A handle into the request's [`BinaryHandleMap`](crate::handle::BinaryHandleMap)
	Handle(BinaryHandle),
	/// A filesystem path or `file://` URL
	Locator(String),
}

/// One entry of a frame-based tag
///
/// # Examples
///
/// ```rust
/// use tagio::frame::{FrameDescriptor, Payload};
///
/// let frames: Vec<FrameDescriptor> = serde_json::from_str(
/// 	r#"[
/// 		{ "kind": "text", "id": "TIT2", "text": "Foo title" },
/// 		{ "kind": "picture", "pictureType": 3, "mimeType": "image/png", "payload": { "handle": 0 } }
/// 	]"#,
/// )
/// .unwrap();
///
/// assert_eq!(frames[0].frame_id(), "TIT2");
/// assert!(!frames[0].is_binary());
/// assert_eq!(frames[1].frame_id(), "APIC");
/// assert!(matches!(frames[1].payload(), Some(Payload::Handle(_))));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
	tag = "kind",
	rename_all = "camelCase",
	rename_all_fields = "camelCase"
)]
pub enum FrameDescriptor {
	/// A text information frame (`T***`, excluding `TXXX`)
	Text {
		/// The frame ID
		id: String,
		/// The frame's content, multiple values are separated by `\0`
		text: String,
	},
	/// A user defined text frame (`TXXX`)
	UserText {
		/// A unique description
		#[serde(default)]
		description: String,
		/// The frame's content
		text: String,
	},
	/// A URL link frame (`W***`, excluding `WXXX`)
	Url {
		/// The frame ID
		id: String,
		/// The link
		url: String,
	},
	/// A user defined URL frame (`WXXX`)
	UserUrl {
		/// A unique description
		#[serde(default)]
		description: String,
		/// The link
		url: String,
	},
	/// A comment frame (`COMM`)
	Comment {
		/// ISO-639-2 language code
		language: String,
		/// A unique description
		#[serde(default)]
		description: String,
		/// The comment
		text: String,
	},
	/// An unsynchronized lyrics frame (`USLT`)
	Lyrics {
		/// ISO-639-2 language code
		language: String,
		/// A unique description
		#[serde(default)]
		description: String,
		/// The lyrics
		text: String,
	},
	/// An attached picture frame (`APIC`)
	Picture {
		/// The APIC picture type, `0..=20`
		picture_type: u8,
		/// The picture's MIME type
		#[serde(default, skip_serializing_if = "Option::is_none")]
		mime_type: Option<String>,
		/// A unique description
		#[serde(default, skip_serializing_if = "Option::is_none")]
		description: Option<String>,
		/// The image data
		payload: Payload,
	},
	/// A general encapsulated object frame (`GEOB`)
	Object {
		/// The object's MIME type
		#[serde(default, skip_serializing_if = "Option::is_none")]
		mime_type: Option<String>,
		/// The object's file name
		#[serde(default, skip_serializing_if = "Option::is_none")]
		file_name: Option<String>,
		/// A unique description
		#[serde(default, skip_serializing_if = "Option::is_none")]
		description: Option<String>,
		/// The object's content
		payload: Payload,
	},
	/// A unique file identifier frame (`UFID`)
	UniqueFileIdentifier {
		/// The owner of the identifier, usually a URL
		owner: String,
		/// The identifier, up to 64 bytes
		payload: Payload,
	},
	/// Any other frame, as its raw content
	Binary {
		/// The frame ID
		id: String,
		/// The frame content, without its header
		payload: Payload,
	},
}

impl FrameDescriptor {
	/// The ID of the frame this descriptor produces
	pub fn frame_id(&self) -> Cow<'_, str> {
		match self {
			FrameDescriptor::Text { id, .. }
			| FrameDescriptor::Url { id, .. }
			| FrameDescriptor::Binary { id, .. } => Cow::Borrowed(id.as_str()),
			FrameDescriptor::UserText { .. } => Cow::Borrowed("TXXX"),
			FrameDescriptor::UserUrl { .. } => Cow::Borrowed("WXXX"),
			FrameDescriptor::Comment { .. } => Cow::Borrowed("COMM"),
			FrameDescriptor::Lyrics { .. } => Cow::Borrowed("USLT"),
			FrameDescriptor::Picture { .. } => Cow::Borrowed("APIC"),
			FrameDescriptor::Object { .. } => Cow::Borrowed("GEOB"),
			FrameDescriptor::UniqueFileIdentifier { .. } => Cow::Borrowed("UFID"),
		}
	}

	/// Whether this kind of frame carries a binary payload
	pub fn is_binary(&self) -> bool {
		self.payload().is_some()
	}

	/// The frame's binary payload, if it is a binary-carrying kind
	pub fn payload(&self) -> Option<&Payload> {
		match self {
			FrameDescriptor::Picture { payload, .. }
			| FrameDescriptor::Object { payload, .. }
			| FrameDescriptor::UniqueFileIdentifier { payload, .. }
			| FrameDescriptor::Binary { payload, .. } => Some(payload),
			_ => None,
		}
	}

	/// Mutable access to the frame's binary payload
	pub fn payload_mut(&mut self) -> Option<&mut Payload> {
		match self {
			FrameDescriptor::Picture { payload, .. }
			| FrameDescriptor::Object { payload, .. }
			| FrameDescriptor::UniqueFileIdentifier { payload, .. }
			| FrameDescriptor::Binary { payload, .. } => Some(payload),
			_ => None,
		}
	}

	/// Check the descriptor's scalar fields
	///
	/// # Errors
	///
	/// * The frame ID is not 4 upper case alphanumeric characters
	/// * A `text` or `url` frame ID has the wrong prefix, or names a user defined frame
	/// * A language code is not 3 ASCII letters
	/// * A picture type is out of range
	/// * A unique file identifier has no owner
	pub fn validate(&self) -> Result<()> {
		let id = self.frame_id();
		if id.len() != 4
			|| !id
				.bytes()
				.all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
		{
			invalid_arg!(@BAIL "invalid frame ID `{id}`");
		}

		match self {
			FrameDescriptor::Text { id, .. } if !id.starts_with('T') || id == "TXXX" => {
				invalid_arg!(@BAIL "`{id}` is not a text information frame");
			},
			FrameDescriptor::Url { id, .. } if !id.starts_with('W') || id == "WXXX" => {
				invalid_arg!(@BAIL "`{id}` is not a URL link frame");
			},
			FrameDescriptor::Comment { language, .. } | FrameDescriptor::Lyrics { language, .. }
				if language_code(language).is_none() =>
			{
				invalid_arg!(@BAIL "invalid language code `{language}` in `{id}`");
			},
			FrameDescriptor::Picture { picture_type, .. } if *picture_type > MAX_PICTURE_TYPE => {
				invalid_arg!(@BAIL "invalid picture type {picture_type}");
			},
			FrameDescriptor::UniqueFileIdentifier { owner, .. } if owner.is_empty() => {
				invalid_arg!(@BAIL "`UFID` frames require an owner");
			},
			_ => {},
		}

		Ok(())
	}
}

pub(crate) fn language_code(language: &str) -> Option<[u8; 3]> {
	let code: [u8; 3] = language.as_bytes().try_into().ok()?;
	if !code.iter().all(u8::is_ascii_alphabetic) {
		return None;
	}

	Some(code)
}

mod base64 {
	use data_encoding::BASE64;
	use serde::{Deserialize, Deserializer, Serializer};

	pub(super) fn serialize<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&BASE64.encode(data))
	}

	pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let encoded = String::deserialize(deserializer)?;
		BASE64
			.decode(encoded.as_bytes())
			.map_err(serde::de::Error::custom)
	}
}
