//! Opened audio containers
//!
//! `AudioFile` is the single entry point into the tag library for the rest of the engine.
//! Opening reads the whole container into memory and releases the file handle, so an
//! `AudioFile` never holds the file open between operations.

use crate::config::{FrameVersion, TagGroup};
use crate::error::{ErrorKind, Result, TagIoError};
use crate::macros::err;
use crate::message::AudioProperties;

use std::fs::{self, File};
use std::io::{BufReader, Cursor, Seek};
use std::path::Path;

use lofty::ape::ApeTag;
use lofty::config::ParseOptions;
use lofty::file::{AudioFile as _, FileType};
use lofty::flac::FlacFile;
use lofty::id3::v1::Id3v1Tag;
use lofty::id3::v2::Id3v2Tag;
use lofty::mpeg::MpegFile;
use lofty::ogg::VorbisComments;
use lofty::probe::Probe;
use lofty::properties::FileProperties;

/// The supported container types
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContainerType {
	/// MPEG audio, usually MP3
	Mpeg,
	/// FLAC
	Flac,
}

impl ContainerType {
	/// The tag groups this container can persist
	///
	/// Every container can be read for any group, groups it cannot carry are simply absent.
	pub fn can_write(self, group: TagGroup) -> bool {
		match (self, group) {
			(_, TagGroup::AudioProperties) => false,
			(_, TagGroup::Generic)
			| (ContainerType::Mpeg, TagGroup::Legacy | TagGroup::Frame | TagGroup::Supplementary)
			| (ContainerType::Flac, TagGroup::CommentBlock) => true,
			_ => false,
		}
	}
}

const FLAC_MARKER: &[u8] = b"fLaC";
const FLAC_BLOCK_HEADER_SIZE: usize = 4;
const FLAC_BLOCK_ID_PADDING: u8 = 1;
const FLAC_LAST_BLOCK: u8 = 0x80;
const FLAC_PADDING_SIZE: u32 = 1024;

/// Make sure a FLAC metadata chain ends in a PADDING block
///
/// The tag library splices new comment blocks in front of a trailing PADDING block. Without one,
/// the previous last block keeps its last-block flag and the new comments are unreachable. A chain
/// ending in any other block has its flag moved onto a freshly inserted PADDING block.
///
/// Streams that do not start with the FLAC marker, or whose chain is truncated, are left as is.
fn end_with_padding(bytes: &mut Vec<u8>) {
	if !bytes.starts_with(FLAC_MARKER) {
		return;
	}

	let mut offset = FLAC_MARKER.len();
	while let Some(header) = bytes.get(offset..offset + FLAC_BLOCK_HEADER_SIZE) {
		let flags = header[0];
		let size = u32::from_be_bytes([0, header[1], header[2], header[3]]) as usize;
		let end = offset + FLAC_BLOCK_HEADER_SIZE + size;

		if flags & FLAC_LAST_BLOCK == 0 {
			offset = end;
			continue;
		}

		if flags & !FLAC_LAST_BLOCK == FLAC_BLOCK_ID_PADDING || end > bytes.len() {
			return;
		}

		log::debug!("FLAC metadata chain does not end in padding, inserting a PADDING block");

		bytes[offset] &= !FLAC_LAST_BLOCK;

		let mut padding = vec![0; FLAC_BLOCK_HEADER_SIZE + FLAC_PADDING_SIZE as usize];
		padding[0] = FLAC_LAST_BLOCK | FLAC_BLOCK_ID_PADDING;
		padding[1..FLAC_BLOCK_HEADER_SIZE].copy_from_slice(&FLAC_PADDING_SIZE.to_be_bytes()[1..]);

		bytes.splice(end..end, padding);
		return;
	}
}

/// An opened container, owning every tag group it holds
pub(crate) enum AudioFile {
	Mpeg(MpegFile),
	Flac(FlacFile),
}

impl AudioFile {
	/// Read the container at `path`
	///
	/// # Errors
	///
	/// * `path` does not exist, or is unreadable
	/// * The file is not MPEG or FLAC
	/// * The tag library fails to parse the file
	pub(crate) fn open(path: &Path, read_properties: bool) -> Result<Self> {
		log::debug!("Opening `{}`", path.display());

		let file = File::open(path)?;
		let probe = Probe::new(BufReader::new(file)).guess_file_type()?;
		let file_type = probe.file_type();

		let mut reader = probe.into_inner();
		reader.rewind()?;

		let parse_options = ParseOptions::new().read_properties(read_properties);
		let audio_file = match file_type {
			Some(FileType::Mpeg) => AudioFile::Mpeg(MpegFile::read_from(&mut reader, parse_options)?),
			Some(FileType::Flac) => AudioFile::Flac(FlacFile::read_from(&mut reader, parse_options)?),
			other => {
				log::debug!("Rejecting file of type {other:?}");
				err!(UnsupportedFormat)
			},
		};

		Ok(audio_file)
	}

	/// Persist every tag group to `path`
	pub(crate) fn save(&self, path: &Path, version: FrameVersion) -> Result<()> {
		log::debug!(
			"Saving `{}` with ID3v2.{}",
			path.display(),
			version.number()
		);

		let write_options = version.write_options();
		match self {
			AudioFile::Mpeg(mpeg) => mpeg.save_to_path(path, write_options)?,
			AudioFile::Flac(flac) => {
				let mut bytes = fs::read(path)?;
				end_with_padding(&mut bytes);

				let mut cursor = Cursor::new(bytes);
				flac.save_to(&mut cursor, write_options)?;
				fs::write(path, cursor.into_inner())?;
			},
		}

		Ok(())
	}

	pub(crate) fn container_type(&self) -> ContainerType {
		match self {
			AudioFile::Mpeg(_) => ContainerType::Mpeg,
			AudioFile::Flac(_) => ContainerType::Flac,
		}
	}

	/// Fail with [`ErrorKind::UnsupportedGroup`] if `group` cannot be written to this container
	pub(crate) fn ensure_writable(&self, group: TagGroup) -> Result<()> {
		if self.container_type().can_write(group) {
			return Ok(());
		}

		Err(TagIoError::new(ErrorKind::UnsupportedGroup(group)))
	}

	pub(crate) fn properties(&self) -> AudioProperties {
		let properties = match self {
			AudioFile::Mpeg(mpeg) => FileProperties::from(mpeg.properties().clone()),
			AudioFile::Flac(flac) => FileProperties::from(flac.properties().clone()),
		};

		AudioProperties::from(properties)
	}

	pub(crate) fn id3v2(&self) -> Option<&Id3v2Tag> {
		match self {
			AudioFile::Mpeg(mpeg) => mpeg.id3v2(),
			AudioFile::Flac(flac) => flac.id3v2(),
		}
	}

	pub(crate) fn id3v1(&self) -> Option<&Id3v1Tag> {
		match self {
			AudioFile::Mpeg(mpeg) => mpeg.id3v1(),
			AudioFile::Flac(_) => None,
		}
	}

	pub(crate) fn ape(&self) -> Option<&ApeTag> {
		match self {
			AudioFile::Mpeg(mpeg) => mpeg.ape(),
			AudioFile::Flac(_) => None,
		}
	}

	pub(crate) fn vorbis_comments(&self) -> Option<&VorbisComments> {
		match self {
			AudioFile::Mpeg(_) => None,
			AudioFile::Flac(flac) => flac.vorbis_comments(),
		}
	}

	/// Mutate the ID3v2 tag, creating it if necessary
	pub(crate) fn with_id3v2<T>(&mut self, f: impl FnOnce(&mut Id3v2Tag) -> Result<T>) -> Result<T> {
		self.ensure_writable(TagGroup::Frame)?;

		let AudioFile::Mpeg(mpeg) = self else {
			err!(UnsupportedGroup(TagGroup::Frame));
		};

		let mut tag = mpeg.remove_id3v2().unwrap_or_default();
		let ret = f(&mut tag);
		mpeg.set_id3v2(tag);

		ret
	}

	/// Replace the ID3v1 tag
	pub(crate) fn set_id3v1(&mut self, tag: Id3v1Tag) -> Result<()> {
		self.ensure_writable(TagGroup::Legacy)?;

		let AudioFile::Mpeg(mpeg) = self else {
			err!(UnsupportedGroup(TagGroup::Legacy));
		};

		mpeg.set_id3v1(tag);
		Ok(())
	}

	/// Mutate the APE tag, creating it if necessary
	pub(crate) fn with_ape<T>(&mut self, f: impl FnOnce(&mut ApeTag) -> Result<T>) -> Result<T> {
		self.ensure_writable(TagGroup::Supplementary)?;

		let AudioFile::Mpeg(mpeg) = self else {
			err!(UnsupportedGroup(TagGroup::Supplementary));
		};

		let mut tag = mpeg.remove_ape().unwrap_or_default();
		let ret = f(&mut tag);
		mpeg.set_ape(tag);

		ret
	}

	/// Mutate the Vorbis comments, creating them if necessary
	pub(crate) fn with_vorbis_comments<T>(
		&mut self,
		f: impl FnOnce(&mut VorbisComments) -> Result<T>,
	) -> Result<T> {
		self.ensure_writable(TagGroup::CommentBlock)?;

		let AudioFile::Flac(flac) = self else {
			err!(UnsupportedGroup(TagGroup::CommentBlock));
		};

		let mut tag = flac.remove_vorbis_comments().unwrap_or_default();
		let ret = f(&mut tag);
		flac.set_vorbis_comments(tag);

		ret
	}
}
