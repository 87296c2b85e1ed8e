use crate::util;

use tagio::config::{BinaryPayloadMode, Configuration, TagGroup};
use tagio::error::{ErrorCategory, ErrorKind};
use tagio::frame::{FrameDescriptor, Payload};
use tagio::handle::{BinaryHandle, BinaryHandleMap, ResourceLocator};
use tagio::request::{TagMutation, WriteRequest};

use std::io::Write as _;
use std::path::Path;

use serde_json::json;

const COVER: &[u8] = b"\x89PNG\r\n\x1a\n not really a PNG, but close enough";

fn resource(content: &[u8]) -> tempfile::NamedTempFile {
	let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
	file.write_all(content).unwrap();
	file.flush().unwrap();

	file
}

fn frame_ids(frames: &[FrameDescriptor]) -> Vec<String> {
	frames.iter().map(|f| f.frame_id().into_owned()).collect()
}

fn text(frames: &[FrameDescriptor], id: &str) -> Vec<String> {
	frames
		.iter()
		.filter_map(|frame| match frame {
			FrameDescriptor::Text { id: frame_id, text } if frame_id == id => Some(text.clone()),
			_ => None,
		})
		.collect()
}

fn write_frames(path: &Path, frames: serde_json::Value) -> tagio::error::Result<Vec<FrameDescriptor>> {
	let mut engine = util::engine();
	let response = util::write_message(&mut engine, path, json!({ "frameTag": frames }))?;
	Ok(response.frame_tag.unwrap_or_default())
}

#[test_log::test]
fn full_replace_is_idempotent() {
	let file = util::mpeg_file();
	let frames = json!([
		{ "kind": "text", "id": "TIT2", "text": "Foo title" },
		{ "kind": "text", "id": "TPE1", "text": "Foo artist" },
		{ "kind": "comment", "language": "eng", "description": "", "text": "Qux comment" },
		{ "kind": "userText", "description": "CATALOG", "text": "ABC-1" },
		{ "kind": "url", "id": "WOAR", "url": "https://example.com/artist" }
	]);

	let first = write_frames(file.path(), frames.clone()).unwrap();
	let second = write_frames(file.path(), frames).unwrap();

	assert_eq!(first, second);
	assert_eq!(
		frame_ids(&second),
		["TIT2", "TPE1", "COMM", "TXXX", "WOAR"]
	);
}

#[test_log::test]
fn untouched_frames_keep_their_order() {
	let file = util::mpeg_file();
	write_frames(
		file.path(),
		json!([
			{ "kind": "text", "id": "TIT2", "text": "Foo title" },
			{ "kind": "text", "id": "TPE1", "text": "Foo artist" },
			{ "kind": "text", "id": "TALB", "text": "Foo album" },
			{ "kind": "userText", "description": "CATALOG", "text": "ABC-1" }
		]),
	)
	.unwrap();

	let catalog = json!([{ "kind": "userText", "description": "CATALOG", "text": "ABC-2" }]);
	let first = write_frames(file.path(), catalog.clone()).unwrap();
	let second = write_frames(file.path(), catalog).unwrap();

	assert_eq!(first, second);
	assert_eq!(frame_ids(&second), ["TIT2", "TPE1", "TALB", "TXXX"]);
	assert_eq!(text(&second, "TALB"), ["Foo album"]);

	// Replacing a frame in the middle moves only that frame
	let frames = write_frames(
		file.path(),
		json!([{ "kind": "text", "id": "TPE1", "text": "Bar artist" }]),
	)
	.unwrap();
	assert_eq!(frame_ids(&frames), ["TIT2", "TALB", "TXXX", "TPE1"]);
}

#[test_log::test]
fn stale_frames_survive() {
	let file = util::mpeg_file();

	write_frames(
		file.path(),
		json!([
			{ "kind": "text", "id": "TIT2", "text": "Foo title" },
			{ "kind": "text", "id": "TPE1", "text": "Foo artist" }
		]),
	)
	.unwrap();

	// TPE1 is not mentioned, so the old frame is never removed
	let frames = write_frames(
		file.path(),
		json!([{ "kind": "text", "id": "TIT2", "text": "Bar title" }]),
	)
	.unwrap();

	assert_eq!(text(&frames, "TIT2"), ["Bar title"]);
	assert_eq!(text(&frames, "TPE1"), ["Foo artist"]);
}

#[test_log::test]
fn replacement_is_by_identifier() {
	let file = util::mpeg_file();

	write_frames(
		file.path(),
		json!([
			{ "kind": "userText", "description": "FOO", "text": "1" },
			{ "kind": "userText", "description": "BAR", "text": "2" }
		]),
	)
	.unwrap();

	// Every TXXX frame goes, not just the one sharing a description
	let frames = write_frames(
		file.path(),
		json!([{ "kind": "userText", "description": "BAZ", "text": "3" }]),
	)
	.unwrap();

	assert_eq!(
		frames,
		[FrameDescriptor::UserText {
			description: String::from("BAZ"),
			text: String::from("3"),
		}]
	);
}

#[test_log::test]
fn binary_round_trip() {
	let file = util::mpeg_file();
	let cover = resource(COVER);
	let mut engine = util::engine();

	let mut handles = BinaryHandleMap::new();
	handles
		.insert(
			BinaryHandle::new(1),
			ResourceLocator::parse(cover.path().to_str().unwrap()).unwrap(),
		)
		.unwrap();

	let mutation = TagMutation {
		frame_tag: Some(vec![FrameDescriptor::Picture {
			picture_type: 3,
			mime_type: Some(String::from("image/png")),
			description: Some(String::from("Front")),
			payload: Payload::Handle(BinaryHandle::new(1)),
		}]),
		..TagMutation::default()
	};
	let request =
		WriteRequest::with_resources(file.path(), Configuration::default(), mutation, handles)
			.unwrap();
	util::write(&mut engine, request).unwrap();

	let frames = util::read_default(&mut engine, file.path())
		.frame_tag
		.unwrap();
	assert_eq!(
		frames,
		[FrameDescriptor::Picture {
			picture_type: 3,
			mime_type: Some(String::from("image/png")),
			description: Some(String::from("Front")),
			payload: Payload::Data(COVER.to_vec()),
		}]
	);
}

#[test_log::test]
fn binary_payload_forms() {
	let file = util::mpeg_file();
	let cover = resource(COVER);
	let object = resource(b"Some notes");
	let mut engine = util::engine();

	let response = util::write_message(
		&mut engine,
		file.path(),
		json!({
			"frameTag": [
				{ "kind": "picture", "pictureType": 4, "mimeType": "image/png", "payload": { "handle": 0 } },
				{
					"kind": "object",
					"mimeType": "text/plain",
					"fileName": "notes.txt",
					"description": "Notes",
					"payload": { "locator": format!("file://{}", object.path().display()) }
				},
				{ "kind": "uniqueFileIdentifier", "owner": "http://www.id3.org/dummy/ufid.html", "payload": { "data": "MTIzNDU=" } }
			],
			"resources": { "0": cover.path() }
		}),
	)
	.unwrap();

	let frames = response.frame_tag.unwrap();
	assert_eq!(frames.len(), 3);
	assert_eq!(frames[0].payload(), Some(&Payload::Data(COVER.to_vec())));
	assert_eq!(
		frames[1],
		FrameDescriptor::Object {
			mime_type: Some(String::from("text/plain")),
			file_name: Some(String::from("notes.txt")),
			description: Some(String::from("Notes")),
			payload: Payload::Data(b"Some notes".to_vec()),
		}
	);
	assert_eq!(frames[2].payload(), Some(&Payload::Data(b"12345".to_vec())));

	// Inline payloads are base64 in messages
	let json = serde_json::to_value(&frames[2]).unwrap();
	assert_eq!(json["payload"]["data"], "MTIzNDU=");
}

#[test_log::test]
fn missing_resource() {
	let file = util::mpeg_file();
	write_frames(
		file.path(),
		json!([{ "kind": "text", "id": "TIT2", "text": "Foo title" }]),
	)
	.unwrap();

	let before = std::fs::read(file.path()).unwrap();

	// Handle 5 has no locator
	let err = write_frames(
		file.path(),
		json!([
			{ "kind": "text", "id": "TIT2", "text": "Bar title" },
			{ "kind": "picture", "pictureType": 3, "payload": { "handle": 5 } }
		]),
	)
	.unwrap_err();

	let ErrorKind::ResourceResolution(resolution) = err.kind() else {
		panic!("Expected a resolution error, got {err:?}");
	};
	assert_eq!(resolution.handle(), Some(BinaryHandle::new(5)));
	assert_eq!(err.category(), ErrorCategory::ResourceResolution);

	// A locator pointing nowhere fails the same way
	let err = write_frames(
		file.path(),
		json!([{ "kind": "binary", "id": "PRIV", "payload": { "locator": "/this/does/not/exist.bin" } }]),
	)
	.unwrap_err();
	assert_eq!(err.category(), ErrorCategory::ResourceResolution);

	assert_eq!(std::fs::read(file.path()).unwrap(), before);

	let mut engine = util::engine();
	let frames = util::read_default(&mut engine, file.path())
		.frame_tag
		.unwrap();
	assert_eq!(text(&frames, "TIT2"), ["Foo title"]);
}

#[test_log::test]
fn malformed_frame_is_fatal() {
	let file = util::mpeg_file();
	let before = std::fs::read(file.path()).unwrap();
	let mut engine = util::engine();

	// TMOO only exists in ID3v2.4
	let err = util::write_message(
		&mut engine,
		file.path(),
		json!({
			"configuration": { "frameVersion": 3 },
			"frameTag": [
				{ "kind": "text", "id": "TIT2", "text": "Foo title" },
				{ "kind": "text", "id": "TMOO", "text": "Calm" }
			]
		}),
	)
	.unwrap_err();

	let ErrorKind::MalformedFrame(malformed) = err.kind() else {
		panic!("Expected a malformed frame error, got {err:?}");
	};
	assert_eq!(malformed.id(), "TMOO");
	assert_eq!(err.category(), ErrorCategory::MalformedFrame);

	assert_eq!(std::fs::read(file.path()).unwrap(), before);

	// The same frame is fine in ID3v2.4
	let frames = write_frames(
		file.path(),
		json!([{ "kind": "text", "id": "TMOO", "text": "Calm" }]),
	)
	.unwrap();
	assert_eq!(text(&frames, "TMOO"), ["Calm"]);
}

#[test_log::test]
fn id3v23_output() {
	let file = util::mpeg_file();
	let mut engine = util::engine();

	let response = util::write_message(
		&mut engine,
		file.path(),
		json!({
			"configuration": { "frameVersion": 3 },
			"frameTag": [
				{ "kind": "text", "id": "TIT2", "text": "Foo title" },
				{ "kind": "lyrics", "language": "eng", "description": "", "text": "La la la" }
			]
		}),
	)
	.unwrap();

	let frames = response.frame_tag.unwrap();
	assert_eq!(text(&frames, "TIT2"), ["Foo title"]);
	assert_eq!(frame_ids(&frames), ["TIT2", "USLT"]);

	let content = std::fs::read(file.path()).unwrap();
	assert_eq!(&content[..4], b"ID3\x03");
}

#[test_log::test]
fn external_locator_export() {
	let file = util::mpeg_file();
	let cover = resource(COVER);
	let payloads = tempfile::tempdir().unwrap();
	let mut engine = util::engine();

	util::write_message(
		&mut engine,
		file.path(),
		json!({
			"frameTag": [
				{ "kind": "text", "id": "TIT2", "text": "Foo title" },
				{ "kind": "picture", "pictureType": 3, "mimeType": "image/png", "payload": { "handle": 0 } },
				{ "kind": "binary", "id": "PCNT", "payload": { "data": "AAAABw==" } }
			],
			"resources": { "0": cover.path() }
		}),
	)
	.unwrap();

	let configuration = Configuration::new()
		.binary_payload_mode(BinaryPayloadMode::ExternalLocator)
		.payload_directory(payloads.path());
	let frames = util::read(&mut engine, file.path(), configuration)
		.unwrap()
		.frame_tag
		.unwrap();

	let locators = frames
		.iter()
		.filter_map(|frame| match frame.payload() {
			Some(Payload::Locator(locator)) => Some(locator.clone()),
			Some(other) => panic!("Expected a locator, got {other:?}"),
			None => None,
		})
		.collect::<Vec<_>>();

	assert_eq!(locators.len(), 2);
	assert_eq!(std::fs::read(&locators[0]).unwrap(), COVER);
	assert_eq!(std::fs::read(&locators[1]).unwrap(), [0, 0, 0, 7]);
	assert!(locators[0].ends_with("-1-APIC.png"));
	assert!(locators[1].ends_with("-2-PCNT.bin"));
	assert!(Path::new(&locators[0]).starts_with(payloads.path()));
}

#[test_log::test]
fn flac_frame_tag_is_read_only() {
	let file = util::flac_file();
	let before = std::fs::read(file.path()).unwrap();

	let err = write_frames(
		file.path(),
		json!([{ "kind": "text", "id": "TIT2", "text": "Foo title" }]),
	)
	.unwrap_err();

	assert!(matches!(
		err.kind(),
		ErrorKind::UnsupportedGroup(TagGroup::Frame)
	));
	assert_eq!(std::fs::read(file.path()).unwrap(), before);
}
