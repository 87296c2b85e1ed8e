//! Two-phase tasks
//!
//! Every request runs as a [`Task`] in two phases:
//!
//! * The *background* phase (`Task::execute`) opens the file, imports the request (for writes),
//!   persists it, and extracts a `TagSnapshot`. It runs on a worker thread, and owns the
//!   request outright.
//! * The *foreground* phase (`complete`) turns that snapshot into a [`Response`]. It runs
//!   on the thread that drains the [`TaskScheduler`], right before the callback is invoked.

mod scheduler;

pub use scheduler::{Callback, SchedulerOptions, TaskId, TaskScheduler};

use crate::codec;
use crate::config::{Configuration, TagGroup};
use crate::container::AudioFile;
use crate::error::Result;
use crate::request::{ReadRequest, WriteRequest};
use crate::response::Response;
use crate::snapshot::TagSnapshot;

/// A unit of work for the [`TaskScheduler`]
#[derive(Clone, Debug)]
pub enum Task {
	/// Read a file's metadata
	Read(ReadRequest),
	/// Change a file's metadata, then read it back
	Write(WriteRequest),
}

impl Task {
	/// The configuration of the underlying request
	pub fn configuration(&self) -> &Configuration {
		match self {
			Task::Read(request) => request.configuration(),
			Task::Write(request) => request.configuration(),
		}
	}

	/// Run the background phase
	pub(crate) fn execute(self) -> Result<TagSnapshot> {
		match self {
			Task::Read(request) => read(request),
			Task::Write(request) => write(request),
		}
	}
}

impl From<ReadRequest> for Task {
	fn from(request: ReadRequest) -> Self {
		Task::Read(request)
	}
}

impl From<WriteRequest> for Task {
	fn from(request: WriteRequest) -> Self {
		Task::Write(request)
	}
}

fn read(request: ReadRequest) -> Result<TagSnapshot> {
	let ReadRequest {
		path,
		configuration,
	} = request;

	let file = AudioFile::open(
		&path,
		configuration.is_readable(TagGroup::AudioProperties),
	)?;
	codec::export(&file, &path, &configuration)
}

fn write(request: WriteRequest) -> Result<TagSnapshot> {
	let WriteRequest {
		path,
		configuration,
		mutation,
		handles,
	} = request;

	if mutation.is_empty() {
		log::debug!("Nothing to write to `{}`", path.display());
	} else {
		let mut staging = AudioFile::open(&path, false)?;
		codec::import(&mut staging, mutation, &handles, &configuration)?;
		staging.save(&path, configuration.frame_version)?;
	}

	// The handles are only needed for the import
	drop(handles);

	let file = AudioFile::open(
		&path,
		configuration.is_readable(TagGroup::AudioProperties),
	)?;
	codec::export(&file, &path, &configuration)
}

/// Run the foreground phase
pub(crate) fn complete(outcome: Result<TagSnapshot>, configuration: &Configuration) -> Result<Response> {
	outcome.map(|snapshot| Response::from_snapshot(snapshot, configuration))
}
