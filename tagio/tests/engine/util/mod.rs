use tagio::Engine;
use tagio::config::Configuration;
use tagio::error::Result;
use tagio::request::{ReadRequest, WriteRequest};
use tagio::response::Response;
use tagio::task::SchedulerOptions;

use std::cell::RefCell;
use std::io::Write as _;
use std::path::Path;
use std::rc::Rc;

use byteorder::{BigEndian, WriteBytesExt};
use tempfile::NamedTempFile;

// MPEG-1 Layer III, 128 kbps, 44.1 kHz, stereo, no CRC, no padding
const MPEG_FRAME_HEADER: u32 = 0xFFFB_9000;
const MPEG_FRAME_LENGTH: usize = 417;
const MPEG_FRAME_COUNT: usize = 32;

pub const FLAC_SAMPLE_RATE: u32 = 44100;
pub const FLAC_CHANNELS: u8 = 2;
pub const FLAC_BIT_DEPTH: u8 = 16;

/// A bare stream of silent MPEG frames, with no tags
pub fn mpeg_bytes() -> Vec<u8> {
	let mut bytes = Vec::with_capacity(MPEG_FRAME_LENGTH * MPEG_FRAME_COUNT);
	for _ in 0..MPEG_FRAME_COUNT {
		bytes.write_u32::<BigEndian>(MPEG_FRAME_HEADER).unwrap();
		bytes.resize(bytes.len() + MPEG_FRAME_LENGTH - 4, 0);
	}

	bytes
}

/// A FLAC stream holding only a STREAMINFO block, describing one second of audio
pub fn flac_bytes() -> Vec<u8> {
	let mut bytes = Vec::new();
	bytes.extend_from_slice(b"fLaC");

	// Last metadata block, STREAMINFO
	bytes.write_u8(0x80).unwrap();
	bytes.write_u24::<BigEndian>(34).unwrap();

	// Min/max block size
	bytes.write_u16::<BigEndian>(4096).unwrap();
	bytes.write_u16::<BigEndian>(4096).unwrap();
	// Min/max frame size (unknown)
	bytes.write_u24::<BigEndian>(0).unwrap();
	bytes.write_u24::<BigEndian>(0).unwrap();

	let total_samples = u64::from(FLAC_SAMPLE_RATE);
	let info = (u64::from(FLAC_SAMPLE_RATE) << 44)
		| (u64::from(FLAC_CHANNELS - 1) << 41)
		| (u64::from(FLAC_BIT_DEPTH - 1) << 36)
		| total_samples;
	bytes.write_u64::<BigEndian>(info).unwrap();

	// MD5 signature
	bytes.extend_from_slice(&[0; 16]);

	// Stand-in for the audio frames
	bytes.extend_from_slice(&[0; 128]);

	bytes
}

fn temp_file(content: &[u8], suffix: &str) -> NamedTempFile {
	let mut file = tempfile::Builder::new()
		.prefix("tagio-")
		.suffix(suffix)
		.tempfile()
		.unwrap();
	file.write_all(content).unwrap();
	file.flush().unwrap();

	file
}

/// A fresh, untagged MP3 file
pub fn mpeg_file() -> NamedTempFile {
	temp_file(&mpeg_bytes(), ".mp3")
}

/// A fresh, untagged FLAC file
pub fn flac_file() -> NamedTempFile {
	temp_file(&flac_bytes(), ".flac")
}

pub fn engine() -> Engine {
	Engine::with_options(&SchedulerOptions::new().worker_threads(2)).unwrap()
}

type Slot = Rc<RefCell<Option<Result<Response>>>>;

fn run(engine: &mut Engine, submit: impl FnOnce(&mut Engine, Slot)) -> Result<Response> {
	let slot = Slot::default();
	submit(engine, Rc::clone(&slot));

	engine.run_until_idle();
	assert_eq!(engine.pending(), 0);

	let result = slot.borrow_mut().take();
	result.expect("the callback should have been invoked")
}

pub fn read(engine: &mut Engine, path: &Path, configuration: Configuration) -> Result<Response> {
	let request = ReadRequest::new(path, configuration).unwrap();
	run(engine, |engine, slot| {
		engine.read(request, move |result| *slot.borrow_mut() = Some(result));
	})
}

pub fn read_default(engine: &mut Engine, path: &Path) -> Response {
	read(engine, path, Configuration::default()).unwrap()
}

pub fn write(engine: &mut Engine, request: WriteRequest) -> Result<Response> {
	run(engine, |engine, slot| {
		engine.write(request, move |result| *slot.borrow_mut() = Some(result));
	})
}

/// Submit a write from its message form, with `path` filled in
pub fn write_message(
	engine: &mut Engine,
	path: &Path,
	mut message: serde_json::Value,
) -> Result<Response> {
	message["path"] = serde_json::Value::from(path.to_str().unwrap());
	let json = message.to_string();

	run(engine, |engine, slot| {
		engine
			.write_message(&json, move |result| *slot.borrow_mut() = Some(result))
			.unwrap();
	})
}
