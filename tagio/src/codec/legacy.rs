//! The legacy fixed-layout tag (ID3v1)

use super::generic::{read_fields, write_fields};
use crate::config::LegacyWriteMode;
use crate::container::AudioFile;
use crate::error::Result;
use crate::message::TagFields;

use lofty::id3::v1::Id3v1Tag;

pub(crate) fn export(file: &AudioFile) -> Option<TagFields> {
	file.id3v1().map(read_fields)
}

/// Copy the requested fields into the legacy tag
///
/// With [`LegacyWriteMode::Replace`], the tag is rebuilt from scratch, so any field missing
/// from `fields` ends up cleared. With [`LegacyWriteMode::Merge`], missing fields keep their
/// current value.
pub(crate) fn import(file: &mut AudioFile, fields: &TagFields, mode: LegacyWriteMode) -> Result<()> {
	let mut tag = match mode {
		LegacyWriteMode::Replace => Id3v1Tag::new(),
		LegacyWriteMode::Merge => file.id3v1().cloned().unwrap_or_default(),
	};

	write_fields(&mut tag, fields);
	file.set_id3v1(tag)
}
