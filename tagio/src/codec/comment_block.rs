//! The comment-block tag (Vorbis comments)

use crate::container::AudioFile;
use crate::error::Result;
use crate::message::FieldListMap;

use lofty::ogg::VorbisComments;

pub(crate) fn export(file: &AudioFile) -> Option<FieldListMap> {
	file.vorbis_comments().map(fields)
}

fn fields(comments: &VorbisComments) -> FieldListMap {
	let mut fields = FieldListMap::new();
	for (key, value) in comments.items() {
		fields
			.entry(String::from(key))
			.or_default()
			.push(String::from(value));
	}

	fields
}

/// Replace every value under each requested key
///
/// Keys are case-insensitive. An empty list only removes the key.
pub(crate) fn import(file: &mut AudioFile, fields: &FieldListMap) -> Result<()> {
	file.with_vorbis_comments(|comments| {
		replace(comments, fields);
		Ok(())
	})
}

fn replace(comments: &mut VorbisComments, fields: &FieldListMap) {
	for (key, values) in fields {
		let removed = comments.remove(key).count();
		log::trace!("Replacing {} `{}` comment(s) with {}", removed, key, values.len());

		for value in values {
			comments.push(key.clone(), value.clone());
		}
	}
}
