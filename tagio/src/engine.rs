//! The request-level entry point

use crate::error::Result;
use crate::request::{ReadRequest, WriteRequest};
use crate::response::Response;
use crate::task::{SchedulerOptions, Task, TaskId, TaskScheduler};

/// Accepts read and write requests, and reports their results through callbacks
///
/// An `Engine` owns a [`TaskScheduler`]. Requests are validated on submission, and only valid
/// requests are scheduled. Callbacks run on the thread that drains the engine, see
/// [`Engine::dispatch_completions`], [`Engine::wait_next`] and [`Engine::run_until_idle`].
///
/// An `Engine` may live inside another async runtime, see [`TaskScheduler`] for how blocking
/// and dropping behave there.
///
/// # Examples
///
/// ```rust,no_run
/// use tagio::Engine;
///
/// # fn main() -> tagio::error::Result<()> {
/// let mut engine = Engine::new()?;
///
/// engine.write_message(
/// 	r#"{ "path": "song.mp3", "legacyTag": { "artist": "A", "album": "B", "track": 1 } }"#,
/// 	|result| match result {
/// 		Ok(response) => assert_eq!(response.legacy_tag.unwrap().artist.as_deref(), Some("A")),
/// 		Err(e) => eprintln!("Write failed: {e}"),
/// 	},
/// )?;
///
/// // A malformed message is rejected right away, and its callback is never invoked
/// assert!(engine.read_message(r#"{ "path": 5 }"#, |_| unreachable!()).is_err());
///
/// engine.run_until_idle();
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct Engine {
	scheduler: TaskScheduler,
}

impl Engine {
	/// Create an `Engine` with the default scheduler options
	///
	/// # Errors
	///
	/// See [`TaskScheduler::new`]
	pub fn new() -> Result<Self> {
		Self::with_options(&SchedulerOptions::default())
	}

	/// Create an `Engine`
	///
	/// # Errors
	///
	/// See [`TaskScheduler::with_options`]
	pub fn with_options(options: &SchedulerOptions) -> Result<Self> {
		Ok(Self {
			scheduler: TaskScheduler::with_options(options)?,
		})
	}

	/// Schedule a read
	pub fn read(
		&mut self,
		request: ReadRequest,
		callback: impl FnOnce(Result<Response>) + 'static,
	) -> TaskId {
		log::debug!("Reading `{}`", request.path().display());
		self.scheduler.submit(Task::Read(request), Box::new(callback))
	}

	/// Schedule a write
	///
	/// The response is read back from the file after it is written.
	pub fn write(
		&mut self,
		request: WriteRequest,
		callback: impl FnOnce(Result<Response>) + 'static,
	) -> TaskId {
		log::debug!("Writing `{}`", request.path().display());
		self.scheduler.submit(Task::Write(request), Box::new(callback))
	}

	/// Schedule a read from its JSON message
	///
	/// # Errors
	///
	/// See [`ReadRequest::from_json`]. On error, `callback` is dropped without being invoked.
	pub fn read_message(
		&mut self,
		json: &str,
		callback: impl FnOnce(Result<Response>) + 'static,
	) -> Result<TaskId> {
		let request = ReadRequest::from_json(json)?;
		Ok(self.read(request, callback))
	}

	/// Schedule a write from its JSON message
	///
	/// # Errors
	///
	/// See [`WriteRequest::from_json`]. On error, `callback` is dropped without being invoked.
	pub fn write_message(
		&mut self,
		json: &str,
		callback: impl FnOnce(Result<Response>) + 'static,
	) -> Result<TaskId> {
		let request = WriteRequest::from_json(json)?;
		Ok(self.write(request, callback))
	}

	/// See [`TaskScheduler::dispatch_completions`]
	pub fn dispatch_completions(&mut self) -> usize {
		self.scheduler.dispatch_completions()
	}

	/// See [`TaskScheduler::wait_next`]
	pub fn wait_next(&mut self) -> bool {
		self.scheduler.wait_next()
	}

	/// See [`TaskScheduler::run_until_idle`]
	pub fn run_until_idle(&mut self) {
		self.scheduler.run_until_idle();
	}

	/// See [`TaskScheduler::pending`]
	pub fn pending(&self) -> usize {
		self.scheduler.pending()
	}
}
