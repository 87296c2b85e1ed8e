//! Per-group Export (container → snapshot) and Import (mutation → container)
//!
//! Each group has its own module, exposing an `export` and (for writable groups) an `import`
//! function. This module applies the configuration's group flags around them.

mod comment_block;
mod generic;
mod legacy;
mod payload;
mod supplementary;

use crate::config::{BinaryPayloadMode, Configuration, TagGroup};
use crate::container::AudioFile;
use crate::error::Result;
use crate::frame::export_frames;
use crate::frame::rewrite::rewrite_frames;
use crate::handle::{BinaryHandleMap, file_url};
use crate::request::TagMutation;
use crate::snapshot::TagSnapshot;

use std::path::Path;

/// Extract every readable group from `file`
///
/// Groups the container does not hold are left as `None`.
pub(crate) fn export(
	file: &AudioFile,
	source: &Path,
	configuration: &Configuration,
) -> Result<TagSnapshot> {
	let path = if configuration.absolute_urls {
		file_url(source)?
	} else {
		source.display().to_string()
	};

	let mut snapshot = TagSnapshot::new(path);

	if configuration.is_readable(TagGroup::AudioProperties) {
		snapshot.audio_properties = Some(file.properties());
	}

	if configuration.is_readable(TagGroup::Generic) {
		snapshot.tag = generic::export(file);
	}

	if configuration.is_readable(TagGroup::Legacy) {
		snapshot.legacy_tag = legacy::export(file);
	}

	if configuration.is_readable(TagGroup::Frame) {
		if let Some(mut frames) = file.id3v2().map(export_frames) {
			if configuration.binary_payload_mode == BinaryPayloadMode::ExternalLocator {
				payload::externalize(&mut frames, source, configuration)?;
			}

			snapshot.frame_tag = Some(frames);
		}
	}

	if configuration.is_readable(TagGroup::CommentBlock) {
		snapshot.comment_block = comment_block::export(file);
	}

	if configuration.is_readable(TagGroup::Supplementary) {
		snapshot.supplementary_tag = supplementary::export(file);
	}

	Ok(snapshot)
}

/// Apply every group present in `mutation` to `file`, in a fixed order
///
/// Groups are expected to already be filtered by the configuration's writable flags. Any error
/// aborts the import, and the caller must not persist `file`.
pub(crate) fn import(
	file: &mut AudioFile,
	mutation: TagMutation,
	handles: &BinaryHandleMap,
	configuration: &Configuration,
) -> Result<()> {
	let TagMutation {
		tag,
		legacy_tag,
		frame_tag,
		comment_block,
		supplementary_tag,
	} = mutation;

	if let Some(fields) = tag {
		log::debug!("Importing {}", TagGroup::Generic);
		generic::import(file, &fields)?;
	}

	if let Some(fields) = legacy_tag {
		log::debug!("Importing {}", TagGroup::Legacy);
		legacy::import(file, &fields, configuration.legacy_write_mode)?;
	}

	if let Some(frames) = frame_tag {
		log::debug!("Importing {} ({} frame(s))", TagGroup::Frame, frames.len());

		let version = configuration.frame_version;
		file.with_id3v2(|tag| rewrite_frames(tag, frames, handles, version))?;
	}

	if let Some(fields) = comment_block {
		log::debug!("Importing {}", TagGroup::CommentBlock);
		comment_block::import(file, &fields)?;
	}

	if let Some(fields) = supplementary_tag {
		log::debug!("Importing {}", TagGroup::Supplementary);
		supplementary::import(file, &fields)?;
	}

	Ok(())
}
