use crate::util;

use tagio::config::Configuration;
use tagio::error::{ErrorCategory, Result};
use tagio::request::ReadRequest;
use tagio::response::Response;
use tagio::task::{SchedulerOptions, Task, TaskId, TaskScheduler};

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use serde_json::json;

type Deliveries = Rc<RefCell<HashMap<TaskId, Vec<(ThreadId, bool)>>>>;

#[test_log::test]
fn exactly_once_on_caller_thread() {
	let files = [util::mpeg_file(), util::flac_file(), util::mpeg_file()];
	let directory = tempfile::tempdir().unwrap();
	let missing = directory.path().join("missing.mp3");

	let mut scheduler =
		TaskScheduler::with_options(&SchedulerOptions::new().worker_threads(2)).unwrap();
	let deliveries = Deliveries::default();

	let mut paths = files.iter().map(|f| f.path().to_path_buf()).collect::<Vec<_>>();
	paths.push(missing);

	let mut ids = Vec::new();
	for path in paths.iter().cycle().take(16) {
		let request = ReadRequest::new(path.as_path(), Configuration::default()).unwrap();

		// The ID is only known after submission
		let id_slot = Rc::new(Cell::new(None::<TaskId>));
		let deliveries = Rc::clone(&deliveries);
		let slot = Rc::clone(&id_slot);

		let id = scheduler.submit(
			Task::from(request),
			Box::new(move |result: Result<Response>| {
				let id = slot.get().expect("submit returned before any callback");
				deliveries
					.borrow_mut()
					.entry(id)
					.or_default()
					.push((thread::current().id(), result.is_ok()));
			}),
		);
		id_slot.set(Some(id));
		ids.push(id);
	}

	assert_eq!(scheduler.pending(), 16);
	scheduler.run_until_idle();
	assert_eq!(scheduler.pending(), 0);

	let deliveries = deliveries.borrow();
	assert_eq!(deliveries.len(), 16);

	let caller = thread::current().id();
	for (i, id) in ids.iter().enumerate() {
		let delivered = &deliveries[id];
		assert_eq!(delivered.len(), 1, "task {id} was delivered {} times", delivered.len());

		let (thread, ok) = delivered[0];
		assert_eq!(thread, caller);

		// Every fourth task reads the missing file
		assert_eq!(ok, i % 4 != 3, "task {id}");
	}
}

#[test_log::test]
fn dispatch_does_not_block() {
	let file = util::mpeg_file();
	let mut engine = util::engine();

	// Nothing submitted
	assert_eq!(engine.dispatch_completions(), 0);

	let delivered = Rc::new(Cell::new(0));
	for _ in 0..4 {
		let delivered = Rc::clone(&delivered);
		engine
			.read_message(
				&json!({ "path": file.path() }).to_string(),
				move |result| {
					assert!(result.is_ok());
					delivered.set(delivered.get() + 1);
				},
			)
			.unwrap();
	}

	let deadline = Instant::now() + Duration::from_secs(30);
	while engine.pending() > 0 {
		assert!(Instant::now() < deadline, "tasks never completed");

		engine.dispatch_completions();
		thread::sleep(Duration::from_millis(5));
	}

	assert_eq!(delivered.get(), 4);
	assert!(!engine.wait_next());
}

#[test_log::test]
fn malformed_messages_are_never_scheduled() {
	let mut engine = util::engine();
	let invoked = Rc::new(Cell::new(false));

	let messages = [
		String::from("not json"),
		String::from(r#"{ "configuration": {} }"#),
		String::from(r#"{ "path": "song.mp3", "configuration": { "frameVersion": 5 } }"#),
		String::from(r#"{ "path": "song.mp3", "unknown": true }"#),
		String::from(r#"{ "path": "song.mp3", "configuration": { "binaryPayloadMode": "externalLocator" } }"#),
	];

	for message in &messages {
		let flag = Rc::clone(&invoked);
		let err = engine
			.read_message(message, move |_| flag.set(true))
			.unwrap_err();
		assert_eq!(err.category(), ErrorCategory::InvalidArgument, "{message}");
	}

	let write_messages = [
		json!({ "path": "song.mp3", "frameTag": [{ "kind": "text", "id": "TXXX", "text": "a" }] }),
		json!({ "path": "song.mp3", "frameTag": [{ "kind": "comment", "language": "english", "text": "a" }] }),
		json!({ "path": "song.mp3", "frameTag": [{ "kind": "picture", "pictureType": 21, "payload": { "data": "" } }] }),
		json!({ "path": "song.mp3", "legacyTag": { "year": 10000 } }),
		json!({ "path": "song.mp3", "resources": { "0": "ftp://example.com/cover.png" } }),
	];

	for message in &write_messages {
		let flag = Rc::clone(&invoked);
		let err = engine
			.write_message(&message.to_string(), move |_| flag.set(true))
			.unwrap_err();
		assert_eq!(err.category(), ErrorCategory::InvalidArgument, "{message}");
	}

	assert_eq!(engine.pending(), 0);
	engine.run_until_idle();
	assert!(!invoked.get());
}
