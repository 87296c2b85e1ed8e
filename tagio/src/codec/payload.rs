//! Writing exported frame payloads out to a directory

use crate::config::Configuration;
use crate::error::Result;
use crate::frame::{FrameDescriptor, Payload};
use crate::handle::file_url;
use crate::macros::invalid_arg;

use std::borrow::Cow;
use std::fs;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::Path;

use lofty::picture::MimeType;

const FALLBACK_EXTENSION: &str = "bin";

/// Replace every inline payload in `frames` with a locator
///
/// Each payload is written to `<payload directory>/<file stem>-<source>-<index>-<frame id>.<ext>`,
/// where `source` is a hash of the source's absolute path and `index` is the descriptor's position
/// in `frames`. Sources sharing a file stem get distinct names, re-exporting a source overwrites
/// its previous payloads.
pub(crate) fn externalize(
	frames: &mut [FrameDescriptor],
	source: &Path,
	configuration: &Configuration,
) -> Result<()> {
	let Some(directory) = configuration.get_payload_directory() else {
		invalid_arg!(@BAIL "external payloads require a payload directory");
	};

	let stem = source
		.file_stem()
		.map_or(Cow::Borrowed("payload"), |stem| stem.to_string_lossy());
	let source_tag = source_tag(source);

	let mut created = false;
	for (index, frame) in frames.iter_mut().enumerate() {
		let name = format!(
			"{stem}-{source_tag}-{index}-{}.{}",
			frame.frame_id(),
			extension(frame)
		);

		let Some(payload) = frame.payload_mut() else {
			continue;
		};

		let Payload::Data(data) = &*payload else {
			continue;
		};

		if !created {
			fs::create_dir_all(directory)?;
			created = true;
		}

		let path = directory.join(name);
		log::trace!("Writing {} byte payload to `{}`", data.len(), path.display());
		fs::write(&path, data.as_slice())?;

		let locator = if configuration.absolute_urls {
			file_url(&path)?
		} else {
			path.to_string_lossy().into_owned()
		};

		*payload = Payload::Locator(locator);
	}

	Ok(())
}

// 8 hex digits identifying the source path
fn source_tag(source: &Path) -> String {
	let absolute = std::path::absolute(source).unwrap_or_else(|_| source.to_path_buf());

	let mut hasher = DefaultHasher::new();
	absolute.hash(&mut hasher);
	format!("{:08x}", hasher.finish() >> 32)
}

fn extension(frame: &FrameDescriptor) -> String {
	let mime_type = match frame {
		FrameDescriptor::Picture { mime_type, .. } | FrameDescriptor::Object { mime_type, .. } => {
			mime_type.as_deref()
		},
		_ => None,
	};

	mime_type
		.and_then(|mime_type| MimeType::from_str(mime_type).ext().map(String::from))
		.unwrap_or_else(|| String::from(FALLBACK_EXTENSION))
}
