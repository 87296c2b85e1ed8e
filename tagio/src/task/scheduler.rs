use super::{Task, complete};
use crate::config::Configuration;
use crate::error::{ErrorKind, Result, TagIoError};
use crate::macros::invalid_arg;
use crate::response::Response;
use crate::snapshot::TagSnapshot;

use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

use tokio::runtime::{Handle, Runtime};

/// The completion callback of a task
///
/// Callbacks are never sent to another thread, they are invoked by whichever thread drains
/// the scheduler.
pub type Callback = Box<dyn FnOnce(Result<Response>)>;

type Completion = (TaskId, Result<TagSnapshot>);

/// Identifies a submitted task until its callback is invoked
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl Display for TaskId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Options to control the [`TaskScheduler`]'s worker pool
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct SchedulerOptions {
	pub(crate) worker_threads: Option<usize>,
	pub(crate) max_blocking_threads: usize,
	pub(crate) thread_name: String,
}

impl Default for SchedulerOptions {
	/// The default implementation for `SchedulerOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// SchedulerOptions {
	/// 	worker_threads: None,
	/// 	max_blocking_threads: 512,
	/// 	thread_name: "tagio-worker",
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}

impl SchedulerOptions {
	/// Default blocking thread limit
	pub const DEFAULT_MAX_BLOCKING_THREADS: usize = 512;

	/// Default worker thread name
	pub const DEFAULT_THREAD_NAME: &'static str = "tagio-worker";

	/// Creates a new `SchedulerOptions`, alias for `Default` implementation
	///
	/// See also: [`SchedulerOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagio::task::SchedulerOptions;
	///
	/// let options = SchedulerOptions::new().worker_threads(2);
	/// ```
	pub fn new() -> Self {
		Self {
			worker_threads: None,
			max_blocking_threads: Self::DEFAULT_MAX_BLOCKING_THREADS,
			thread_name: String::from(Self::DEFAULT_THREAD_NAME),
		}
	}

	/// The number of async worker threads
	///
	/// By default, this is the number of cores available to the process.
	pub fn worker_threads(mut self, worker_threads: usize) -> Self {
		self.worker_threads = Some(worker_threads);
		self
	}

	/// The maximum number of threads running background phases at once
	pub fn max_blocking_threads(mut self, max_blocking_threads: usize) -> Self {
		self.max_blocking_threads = max_blocking_threads;
		self
	}

	/// The name given to every pool thread
	pub fn thread_name(mut self, thread_name: impl Into<String>) -> Self {
		self.thread_name = thread_name.into();
		self
	}

	fn build_runtime(&self) -> Result<Runtime> {
		if self.worker_threads == Some(0) {
			invalid_arg!(@BAIL "`worker_threads` must be greater than 0");
		}

		if self.max_blocking_threads == 0 {
			invalid_arg!(@BAIL "`max_blocking_threads` must be greater than 0");
		}

		let mut builder = tokio::runtime::Builder::new_multi_thread();
		if let Some(worker_threads) = self.worker_threads {
			builder.worker_threads(worker_threads);
		}

		let runtime = builder
			.max_blocking_threads(self.max_blocking_threads)
			.thread_name(self.thread_name.clone())
			.build()?;

		Ok(runtime)
	}
}

struct PendingTask {
	configuration: Configuration,
	callback: Callback,
}

/// Runs background phases on a worker pool, and foreground phases on the caller's thread
///
/// [`TaskScheduler::submit`] never blocks. Finished background phases queue up until the
/// owner drains them with [`TaskScheduler::dispatch_completions`], [`TaskScheduler::wait_next`]
/// or [`TaskScheduler::run_until_idle`]. Draining runs the foreground phase, and invokes the
/// callback exactly once per task, one task at a time.
///
/// There is no cancellation, and no ordering between tasks, even for the same path.
///
/// The scheduler owns its worker pool, and may be created, drained and dropped from within
/// another async runtime. Blocking in [`TaskScheduler::wait_next`] parks the calling thread, so
/// async callers should prefer [`TaskScheduler::dispatch_completions`]. Dropping the scheduler
/// outside of an async runtime waits for every running background phase. Inside one, the pool
/// is shut down in the background instead, and running phases finish on their own.
///
/// # Examples
///
/// ```rust,no_run
/// use tagio::config::Configuration;
/// use tagio::request::ReadRequest;
/// use tagio::task::{Task, TaskScheduler};
///
/// # fn main() -> tagio::error::Result<()> {
/// let mut scheduler = TaskScheduler::new()?;
///
/// let request = ReadRequest::new("song.mp3", Configuration::default())?;
/// scheduler.submit(
/// 	Task::from(request),
/// 	Box::new(|result: tagio::error::Result<tagio::response::Response>| match result {
/// 		Ok(response) => println!("{:?}", response.tag),
/// 		Err(e) => eprintln!("{e}"),
/// 	}),
/// );
///
/// scheduler.run_until_idle();
/// # Ok(()) }
/// ```
pub struct TaskScheduler {
	// Only taken on drop
	runtime: Option<Runtime>,
	handle: Handle,
	sender: Sender<Completion>,
	receiver: Receiver<Completion>,
	pending: HashMap<TaskId, PendingTask>,
	running: Arc<AtomicUsize>,
	next_id: u64,
}

impl TaskScheduler {
	/// Create a `TaskScheduler` with the default options
	///
	/// # Errors
	///
	/// See [`TaskScheduler::with_options`]
	pub fn new() -> Result<Self> {
		Self::with_options(&SchedulerOptions::default())
	}

	/// Create a `TaskScheduler`
	///
	/// # Errors
	///
	/// * A thread count is zero
	/// * The worker pool could not be started
	pub fn with_options(options: &SchedulerOptions) -> Result<Self> {
		let runtime = options.build_runtime()?;
		let handle = runtime.handle().clone();
		let (sender, receiver) = mpsc::channel();

		Ok(Self {
			runtime: Some(runtime),
			handle,
			sender,
			receiver,
			pending: HashMap::new(),
			running: Arc::new(AtomicUsize::new(0)),
			next_id: 0,
		})
	}

	/// Queue `task`, returning immediately
	///
	/// `callback` is invoked once the task finishes, and the scheduler is drained.
	pub fn submit(&mut self, task: Task, callback: Callback) -> TaskId {
		let id = TaskId(self.next_id);
		self.next_id += 1;

		self.pending.insert(
			id,
			PendingTask {
				configuration: task.configuration().clone(),
				callback,
			},
		);

		let sender = self.sender.clone();
		let running = Arc::clone(&self.running);
		running.fetch_add(1, Ordering::AcqRel);

		log::debug!("Submitting task {id}");
		self.handle.spawn(async move {
			let outcome = match tokio::task::spawn_blocking(move || task.execute()).await {
				Ok(outcome) => outcome,
				Err(e) => {
					log::error!("Task {id} did not run to completion: {e}");
					Err(TagIoError::new(ErrorKind::TaskFailed(e.to_string())))
				},
			};

			running.fetch_sub(1, Ordering::AcqRel);
			if sender.send((id, outcome)).is_err() {
				log::warn!("Task {id} finished after its scheduler was dropped");
			}
		});

		id
	}

	/// Run every finished foreground phase without blocking
	///
	/// Returns the number of callbacks invoked.
	pub fn dispatch_completions(&mut self) -> usize {
		let mut delivered = 0;
		while let Ok((id, outcome)) = self.receiver.try_recv() {
			self.deliver(id, outcome);
			delivered += 1;
		}

		delivered
	}

	/// Block until one task finishes, and run its foreground phase
	///
	/// Returns `false` immediately if no task is pending.
	pub fn wait_next(&mut self) -> bool {
		if self.pending.is_empty() {
			return false;
		}

		match self.receiver.recv() {
			Ok((id, outcome)) => {
				self.deliver(id, outcome);
				true
			},
			Err(_) => false,
		}
	}

	/// Block until every submitted task has had its callback invoked
	pub fn run_until_idle(&mut self) {
		while self.wait_next() {}
	}

	/// The number of tasks whose callback has not been invoked yet
	pub fn pending(&self) -> usize {
		self.pending.len()
	}

	/// The number of background phases currently running or queued on the pool
	pub fn running(&self) -> usize {
		self.running.load(Ordering::Acquire)
	}

	fn deliver(&mut self, id: TaskId, outcome: Result<TagSnapshot>) {
		let Some(PendingTask {
			configuration,
			callback,
		}) = self.pending.remove(&id)
		else {
			log::warn!("Dropping completion for unknown task {id}");
			return;
		};

		if let Err(e) = &outcome {
			log::debug!("Task {id} failed: {e}");
		}

		callback(complete(outcome, &configuration));
	}
}

impl Drop for TaskScheduler {
	fn drop(&mut self) {
		let Some(runtime) = self.runtime.take() else {
			return;
		};

		// A runtime may not block on its shutdown from within another runtime
		if Handle::try_current().is_ok() {
			log::debug!("Dropping scheduler inside an async context, shutting down in the background");
			runtime.shutdown_background();
		}
	}
}

impl Debug for TaskScheduler {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TaskScheduler")
			.field("pending", &self.pending.len())
			.field("running", &self.running())
			.field("next_id", &self.next_id)
			.finish_non_exhaustive()
	}
}
