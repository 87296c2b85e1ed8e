use crate::config::FrameVersion;
use crate::error::{MalformedFrameError, Result};

use std::io::Cursor;

use lofty::config::ParseOptions;
use lofty::file::AudioFile;
use lofty::id3::v2::{Frame, Id3v2Tag};
use lofty::mpeg::MpegFile;
use lofty::tag::TagExt;

/// Render `frame` to its wire form, and parse it back
///
/// The frame is written as the only frame of a scratch ID3v2 tag, using the writer for
/// `version`, and the resulting bytes are read back with the same reader used for real files.
/// What comes back is what the tag library would find in the file after persisting, so it
/// is what gets inserted into the destination tag.
///
/// Usually a single frame comes back, but version conversions may split or rename it (ex.
/// `TDRC` is written as `TYER` + `TDAT` in ID3v2.3, and read back as `TDRC`).
///
/// # Errors
///
/// * The frame cannot be rendered
/// * No frame survives the round trip (ex. a frame that does not exist in ID3v2.3)
pub(super) fn normalize(frame: Frame<'static>, version: FrameVersion) -> Result<Vec<Frame<'static>>> {
	let id = String::from(frame.id_str());

	let mut scratch = Id3v2Tag::new();
	scratch.insert(frame);

	let mut rendered = Vec::new();
	scratch
		.dump_to(&mut rendered, version.write_options())
		.map_err(|e| MalformedFrameError::new(&*id, format!("unable to render: {e}")))?;

	log::trace!(
		"Rendered frame `{}` as ID3v2.{} ({} bytes)",
		id,
		version.number(),
		rendered.len()
	);

	if rendered.is_empty() {
		return Err(MalformedFrameError::new(id, "the frame was discarded while rendering").into());
	}

	let parsed = MpegFile::read_from(
		&mut Cursor::new(rendered),
		ParseOptions::new().read_properties(false),
	)
	.map_err(|e| MalformedFrameError::new(&*id, format!("unable to parse back: {e}")))?;

	let frames = parsed
		.id3v2()
		.map(|tag| tag.into_iter().cloned().collect::<Vec<_>>())
		.unwrap_or_default();

	if frames.is_empty() {
		return Err(MalformedFrameError::new(
			id,
			format!(
				"the frame did not survive being written as ID3v2.{}",
				version.number()
			),
		)
		.into());
	}

	Ok(frames)
}
