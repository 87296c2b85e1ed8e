use super::{FrameDescriptor, Payload};

use lofty::id3::v2::{Frame, FrameFlags, GeneralEncapsulatedObject, Id3v2Tag};

/// Convert every representable frame of `tag` into a descriptor, in tag order
///
/// Binary payloads are always exported as [`Payload::Data`], it is up to the caller to
/// move them elsewhere.
pub(crate) fn export_frames(tag: &Id3v2Tag) -> Vec<FrameDescriptor> {
	let mut descriptors = Vec::new();

	for frame in tag {
		match export_frame(frame) {
			Some(descriptor) => descriptors.push(descriptor),
			None => log::debug!("Skipping unrepresentable frame `{}`", frame.id_str()),
		}
	}

	descriptors
}

fn export_frame(frame: &Frame<'_>) -> Option<FrameDescriptor> {
	let id = String::from(frame.id_str());

	let descriptor = match frame {
		Frame::Text(text) => FrameDescriptor::Text {
			id,
			text: String::from(&*text.value),
		},
		// Dates are parsed into timestamps, they're still text frames on disk
		Frame::Timestamp(timestamp) => FrameDescriptor::Text {
			id,
			text: timestamp.timestamp.to_string(),
		},
		Frame::UserText(user_text) => FrameDescriptor::UserText {
			description: String::from(&*user_text.description),
			text: String::from(&*user_text.content),
		},
		Frame::Url(url) => FrameDescriptor::Url {
			id,
			url: String::from(url.url()),
		},
		Frame::UserUrl(user_url) => FrameDescriptor::UserUrl {
			description: String::from(&*user_url.description),
			url: String::from(&*user_url.content),
		},
		Frame::Comment(comment) => FrameDescriptor::Comment {
			language: String::from_utf8_lossy(&comment.language).into_owned(),
			description: String::from(&*comment.description),
			text: String::from(&*comment.content),
		},
		Frame::UnsynchronizedText(lyrics) => FrameDescriptor::Lyrics {
			language: String::from_utf8_lossy(&lyrics.language).into_owned(),
			description: String::from(&*lyrics.description),
			text: String::from(&*lyrics.content),
		},
		Frame::Picture(attached) => {
			let picture = &attached.picture;
			FrameDescriptor::Picture {
				picture_type: picture.pic_type().as_u8(),
				mime_type: picture.mime_type().map(|m| String::from(m.as_str())),
				description: picture.description().map(String::from),
				payload: Payload::Data(picture.data().to_vec()),
			}
		},
		Frame::UniqueFileIdentifier(ufid) => FrameDescriptor::UniqueFileIdentifier {
			owner: String::from(&*ufid.owner),
			payload: Payload::Data(ufid.identifier.to_vec()),
		},
		Frame::Binary(binary) if id == "GEOB" => {
			match GeneralEncapsulatedObject::parse(&binary.data, FrameFlags::default()) {
				Ok(object) => FrameDescriptor::Object {
					mime_type: object.mime_type,
					file_name: object.file_name,
					description: object.descriptor,
					payload: Payload::Data(object.data),
				},
				Err(e) => {
					log::warn!("Unable to parse `GEOB` frame, exporting as binary: {e}");
					FrameDescriptor::Binary {
						id,
						payload: Payload::Data(binary.data.to_vec()),
					}
				},
			}
		},
		Frame::Binary(binary) => FrameDescriptor::Binary {
			id,
			payload: Payload::Data(binary.data.to_vec()),
		},
		_ => return None,
	};

	Some(descriptor)
}
