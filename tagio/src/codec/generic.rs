//! The generic tag, a union view over every tag in a container

use crate::container::{AudioFile, ContainerType};
use crate::error::Result;
use crate::message::TagFields;

use std::borrow::Cow;

use lofty::tag::Accessor;

/// Read the common fields of any tag
pub(crate) fn read_fields<T: Accessor>(tag: &T) -> TagFields {
	TagFields {
		title: tag.title().map(Cow::into_owned),
		album: tag.album().map(Cow::into_owned),
		artist: tag.artist().map(Cow::into_owned),
		track: tag.track(),
		year: tag.year(),
		genre: tag.genre().map(Cow::into_owned),
		comment: tag.comment().map(Cow::into_owned),
	}
}

/// Copy every set field into `tag`, leaving the rest alone
pub(crate) fn write_fields<T: Accessor>(tag: &mut T, fields: &TagFields) {
	if let Some(title) = &fields.title {
		tag.set_title(title.clone());
	}
	if let Some(album) = &fields.album {
		tag.set_album(album.clone());
	}
	if let Some(artist) = &fields.artist {
		tag.set_artist(artist.clone());
	}
	if let Some(track) = fields.track {
		tag.set_track(track);
	}
	if let Some(year) = fields.year {
		tag.set_year(year);
	}
	if let Some(genre) = &fields.genre {
		tag.set_genre(genre.clone());
	}
	if let Some(comment) = &fields.comment {
		tag.set_comment(comment.clone());
	}
}

/// Merge the fields of every tag in the container, highest priority first
///
/// MPEG: ID3v2, APE, ID3v1
/// FLAC: Vorbis comments, ID3v2
pub(crate) fn export(file: &AudioFile) -> Option<TagFields> {
	let views = match file.container_type() {
		ContainerType::Mpeg => [
			file.id3v2().map(read_fields),
			file.ape().map(read_fields),
			file.id3v1().map(read_fields),
		],
		ContainerType::Flac => [
			file.vorbis_comments().map(read_fields),
			file.id3v2().map(read_fields),
			None,
		],
	};

	let mut present = views.into_iter().flatten();
	let mut fields = present.next()?;
	for lower in present {
		fields.fill_from(lower);
	}

	Some(fields)
}

/// Write into the container's primary tag, creating it if necessary
pub(crate) fn import(file: &mut AudioFile, fields: &TagFields) -> Result<()> {
	match file.container_type() {
		ContainerType::Mpeg => file.with_id3v2(|tag| {
			write_fields(tag, fields);
			Ok(())
		}),
		ContainerType::Flac => file.with_vorbis_comments(|comments| {
			write_fields(comments, fields);
			Ok(())
		}),
	}
}
