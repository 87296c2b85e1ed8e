use crate::util;

use tagio::config::{Configuration, GroupAccess, TagGroup};
use tagio::error::{ErrorCategory, ErrorKind};

use serde_json::json;

fn response_keys(response: &tagio::response::Response) -> Vec<String> {
	let json = response.to_json().unwrap();
	json.as_object().unwrap().keys().cloned().collect()
}

#[test_log::test]
fn keys_follow_readable_flags() {
	let file = util::mpeg_file();
	let mut engine = util::engine();

	util::write_message(
		&mut engine,
		file.path(),
		json!({
			"tag": { "title": "Foo title", "artist": "Foo artist" },
			"legacyTag": { "title": "Bar title" },
			"supplementaryTag": { "Title": "Baz title" }
		}),
	)
	.unwrap();

	let response = util::read_default(&mut engine, file.path());
	assert_eq!(
		response_keys(&response),
		[
			"audioProperties",
			"frameTag",
			"legacyTag",
			"path",
			"supplementaryTag",
			"tag"
		]
	);

	// Every group is present in the file, only the readable ones are reported
	let configuration = Configuration::new()
		.all_groups(GroupAccess::DISABLED)
		.readable(TagGroup::Legacy, true)
		.readable(TagGroup::Supplementary, true);
	let response = util::read(&mut engine, file.path(), configuration).unwrap();
	assert_eq!(
		response_keys(&response),
		["legacyTag", "path", "supplementaryTag"]
	);

	let response = util::read(
		&mut engine,
		file.path(),
		Configuration::new().all_groups(GroupAccess::DISABLED),
	)
	.unwrap();
	assert_eq!(response_keys(&response), ["path"]);
}

#[test_log::test]
fn generic_and_legacy_only() {
	let file = util::mpeg_file();
	let mut engine = util::engine();

	// Only an ID3v1 tag is created
	util::write_message(
		&mut engine,
		file.path(),
		json!({ "legacyTag": { "title": "Foo title", "artist": "Foo artist", "year": 1999 } }),
	)
	.unwrap();

	let response = util::read_default(&mut engine, file.path());
	assert!(response.tag.is_some());
	assert!(response.legacy_tag.is_some());
	assert!(response.frame_tag.is_none());
	assert!(response.comment_block.is_none());
	assert!(response.supplementary_tag.is_none());

	// The generic tag falls back to the legacy tag
	let tag = response.tag.unwrap();
	assert_eq!(tag.title.as_deref(), Some("Foo title"));
	assert_eq!(tag.artist.as_deref(), Some("Foo artist"));
	assert_eq!(tag.year, Some(1999));
}

#[test_log::test]
fn generic_tag_priority() {
	let file = util::mpeg_file();
	let mut engine = util::engine();

	util::write_message(
		&mut engine,
		file.path(),
		json!({
			"tag": { "title": "ID3v2 title" },
			"legacyTag": { "title": "ID3v1 title", "album": "ID3v1 album" },
			"supplementaryTag": { "Title": "APE title", "Artist": "APE artist" }
		}),
	)
	.unwrap();

	let tag = util::read_default(&mut engine, file.path()).tag.unwrap();
	assert_eq!(tag.title.as_deref(), Some("ID3v2 title"));
	assert_eq!(tag.artist.as_deref(), Some("APE artist"));
	assert_eq!(tag.album.as_deref(), Some("ID3v1 album"));
}

#[test_log::test]
fn untagged_files() {
	let mut engine = util::engine();

	let mpeg = util::mpeg_file();
	let response = util::read_default(&mut engine, mpeg.path());
	assert_eq!(response_keys(&response), ["audioProperties", "path"]);

	let flac = util::flac_file();
	let response = util::read_default(&mut engine, flac.path());
	assert_eq!(response_keys(&response), ["audioProperties", "path"]);
}

#[test_log::test]
fn flac_properties() {
	let file = util::flac_file();
	let mut engine = util::engine();

	let properties = util::read_default(&mut engine, file.path())
		.audio_properties
		.unwrap();

	assert_eq!(properties.duration, 1000);
	assert_eq!(properties.sample_rate, Some(util::FLAC_SAMPLE_RATE));
	assert_eq!(properties.channels, Some(util::FLAC_CHANNELS));
	assert_eq!(properties.bit_depth, Some(util::FLAC_BIT_DEPTH));
}

#[test_log::test]
fn mpeg_properties() {
	let file = util::mpeg_file();
	let mut engine = util::engine();

	let properties = util::read_default(&mut engine, file.path())
		.audio_properties
		.unwrap();

	assert_eq!(properties.sample_rate, Some(44100));
	assert_eq!(properties.channels, Some(2));
}

#[test_log::test]
fn absolute_urls() {
	let file = util::mpeg_file();
	let mut engine = util::engine();

	let response = util::read(
		&mut engine,
		file.path(),
		Configuration::new().absolute_urls(true),
	)
	.unwrap();

	assert!(response.path.starts_with("file:///"));
	assert!(response.path.ends_with(".mp3"));
}

#[test_log::test]
fn unsupported_format() {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	std::io::Write::write_all(&mut file, b"This is not an audio file, just some text.").unwrap();

	let mut engine = util::engine();
	let err = util::read(&mut engine, file.path(), Configuration::default()).unwrap_err();

	assert!(matches!(err.kind(), ErrorKind::UnsupportedFormat));
	assert_eq!(err.category(), ErrorCategory::Io);
}

#[test_log::test]
fn missing_file() {
	let directory = tempfile::tempdir().unwrap();
	let mut engine = util::engine();

	let err = util::read(
		&mut engine,
		&directory.path().join("missing.mp3"),
		Configuration::default(),
	)
	.unwrap_err();

	assert!(matches!(err.kind(), ErrorKind::Io(_)));
	assert_eq!(err.category(), ErrorCategory::Io);
}
