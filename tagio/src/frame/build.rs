use super::{FrameDescriptor, language_code};
use crate::config::FrameVersion;
use crate::error::{MalformedFrameError, Result};

use lofty::TextEncoding;
use lofty::id3::v2::{
	AttachedPictureFrame, BinaryFrame, CommentFrame, ExtendedTextFrame, ExtendedUrlFrame, Frame,
	FrameId, GeneralEncapsulatedObject, TextInformationFrame, UniqueFileIdentifierFrame,
	UnsynchronizedTextFrame, UrlLinkFrame,
};
use lofty::picture::{MimeType, Picture, PictureType};

/// ID3v2.3 has no UTF-8, everything else is written as UTF-8
fn text_encoding(version: FrameVersion) -> TextEncoding {
	match version {
		FrameVersion::V3 => TextEncoding::UTF16,
		FrameVersion::V4 => TextEncoding::UTF8,
	}
}

fn frame_id(id: &str) -> Result<FrameId<'static>> {
	FrameId::new(String::from(id))
		.map_err(|e| MalformedFrameError::new(id, format!("invalid frame ID: {e}")).into())
}

/// Create the tag library's representation of `descriptor`
///
/// `payload` must hold the resolved bytes for binary-carrying descriptors, and is ignored for
/// every other kind.
pub(super) fn build_frame(
	descriptor: &FrameDescriptor,
	payload: Option<Vec<u8>>,
	version: FrameVersion,
) -> Result<Frame<'static>> {
	let encoding = text_encoding(version);
	let payload = || {
		payload.ok_or_else(|| {
			MalformedFrameError::new(descriptor.frame_id(), "binary payload was not resolved")
		})
	};

	let frame = match descriptor {
		FrameDescriptor::Text { id, text } => Frame::Text(TextInformationFrame::new(
			frame_id(id)?,
			encoding,
			text.clone(),
		)),
		FrameDescriptor::UserText { description, text } => Frame::UserText(
			ExtendedTextFrame::new(encoding, description.clone(), text.clone()),
		),
		FrameDescriptor::Url { id, url } => {
			Frame::Url(UrlLinkFrame::new(frame_id(id)?, url.clone()))
		},
		FrameDescriptor::UserUrl { description, url } => Frame::UserUrl(ExtendedUrlFrame::new(
			encoding,
			description.clone(),
			url.clone(),
		)),
		FrameDescriptor::Comment {
			language,
			description,
			text,
		} => Frame::Comment(CommentFrame::new(
			encoding,
			language_bytes(descriptor, language)?,
			description.clone(),
			text.clone(),
		)),
		FrameDescriptor::Lyrics {
			language,
			description,
			text,
		} => Frame::UnsynchronizedText(UnsynchronizedTextFrame::new(
			encoding,
			language_bytes(descriptor, language)?,
			description.clone(),
			text.clone(),
		)),
		FrameDescriptor::Picture {
			picture_type,
			mime_type,
			description,
			..
		} => {
			let picture = Picture::new_unchecked(
				PictureType::from_u8(*picture_type),
				mime_type.as_deref().map(MimeType::from_str),
				description.clone(),
				payload()?,
			);

			Frame::Picture(AttachedPictureFrame::new(encoding, picture))
		},
		FrameDescriptor::Object {
			mime_type,
			file_name,
			description,
			..
		} => {
			// GEOB has no dedicated frame type, it is carried as a binary frame
			let object = GeneralEncapsulatedObject::new(
				encoding,
				mime_type.clone(),
				file_name.clone(),
				description.clone(),
				payload()?,
			);

			Frame::Binary(BinaryFrame::new(frame_id("GEOB")?, object.as_bytes()))
		},
		FrameDescriptor::UniqueFileIdentifier { owner, .. } => Frame::UniqueFileIdentifier(
			UniqueFileIdentifierFrame::new(owner.clone(), payload()?),
		),
		FrameDescriptor::Binary { id, .. } => {
			Frame::Binary(BinaryFrame::new(frame_id(id)?, payload()?))
		},
	};

	Ok(frame)
}

fn language_bytes(descriptor: &FrameDescriptor, language: &str) -> Result<[u8; 3]> {
	language_code(language).ok_or_else(|| {
		MalformedFrameError::new(
			descriptor.frame_id(),
			format!("invalid language code `{language}`"),
		)
		.into()
	})
}
