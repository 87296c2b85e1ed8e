//! Contains the errors that can arise within TagIO
//!
//! The primary error is [`TagIoError`]. The type of error is determined by [`ErrorKind`],
//! which can be extended at any time. Every kind belongs to exactly one [`ErrorCategory`],
//! the coarse classification reported back to callers.

use crate::config::TagGroup;
use crate::handle::BinaryHandle;

use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;

use lofty::error::LoftyError;

/// Alias for `Result<T, TagIoError>`
pub type Result<T> = std::result::Result<T, TagIoError>;

/// The types of errors that can occur
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
	// Request related errors
	/// A request or configuration is malformed, or is missing required fields
	InvalidArgument(String),
	/// A request message could not be deserialized
	Json(serde_json::Error),

	// Container related errors
	/// The file is not one of the supported containers
	UnsupportedFormat,
	/// Attempted to write a tag group that the container cannot carry
	UnsupportedGroup(TagGroup),

	// Frame rewrite errors
	/// A binary handle could not be resolved to its resource
	ResourceResolution(ResourceResolutionError),
	/// A frame could not be parsed back after rendering
	MalformedFrame(MalformedFrameError),

	/// The background phase of a task did not run to completion
	TaskFailed(String),

	// Conversions for external errors
	/// Errors raised by the tag library
	Lofty(LoftyError),
	/// Represents all cases of [`std::io::Error`].
	Io(std::io::Error),
}

/// The coarse classification of a [`TagIoError`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCategory {
	/// Malformed or missing request fields, detected before scheduling
	InvalidArgument,
	/// The file is missing, unreadable, unwritable, or could not be persisted
	Io,
	/// A binary resource referenced by a write could not be loaded
	ResourceResolution,
	/// A frame did not survive its render/re-parse round trip
	MalformedFrame,
	/// The engine itself failed to deliver a result
	Internal,
}

/// An error that occurs while resolving a [`BinaryHandle`]
pub struct ResourceResolutionError {
	handle: Option<BinaryHandle>,
	locator: Option<PathBuf>,
	source: Option<std::io::Error>,
}

impl ResourceResolutionError {
	/// The handle has no resource registered for it
	pub(crate) fn unknown_handle(handle: BinaryHandle) -> Self {
		Self {
			handle: Some(handle),
			locator: None,
			source: None,
		}
	}

	/// The resource at `locator` could not be read
	pub(crate) fn unreadable(
		handle: Option<BinaryHandle>,
		locator: PathBuf,
		source: std::io::Error,
	) -> Self {
		Self {
			handle,
			locator: Some(locator),
			source: Some(source),
		}
	}

	/// The handle that failed to resolve, if the payload was referenced by one
	pub fn handle(&self) -> Option<BinaryHandle> {
		self.handle
	}

	/// The locator the handle resolved to, if it resolved at all
	pub fn locator(&self) -> Option<&std::path::Path> {
		self.locator.as_deref()
	}
}

impl Debug for ResourceResolutionError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ResourceResolutionError")
			.field("handle", &self.handle)
			.field("locator", &self.locator)
			.field("source", &self.source)
			.finish()
	}
}

impl Display for ResourceResolutionError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match (&self.handle, &self.locator, &self.source) {
			(Some(handle), None, _) => {
				write!(f, "Binary handle {handle} has no registered resource")
			},
			(handle, Some(locator), source) => {
				if let Some(handle) = handle {
					write!(f, "Binary handle {handle}: ")?;
				}

				write!(f, "unable to load `{}`", locator.display())?;
				if let Some(source) = source {
					write!(f, ": {source}")?;
				}

				Ok(())
			},
			(None, None, _) => write!(f, "Unable to resolve binary payload"),
		}
	}
}

/// An error that occurs when a frame does not survive normalization
#[derive(Debug)]
pub struct MalformedFrameError {
	id: String,
	reason: String,
}

impl MalformedFrameError {
	pub(crate) fn new(id: impl Into<String>, reason: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			reason: reason.into(),
		}
	}

	/// The identifier of the offending frame
	pub fn id(&self) -> &str {
		&self.id
	}

	/// A description of what went wrong
	pub fn reason(&self) -> &str {
		&self.reason
	}
}

impl Display for MalformedFrameError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "Frame `{}`: {}", self.id, self.reason)
	}
}

/// Errors that could occur within TagIO
pub struct TagIoError {
	pub(crate) kind: ErrorKind,
}

impl TagIoError {
	/// Create a `TagIoError` from an [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagio::error::{ErrorKind, TagIoError};
	///
	/// let unsupported = TagIoError::new(ErrorKind::UnsupportedFormat);
	/// ```
	#[must_use]
	pub const fn new(kind: ErrorKind) -> Self {
		Self { kind }
	}

	/// Returns the [`ErrorKind`]
	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}

	/// Returns the [`ErrorCategory`] this error is reported under
	///
	/// # Examples
	///
	/// ```rust
	/// use tagio::error::{ErrorCategory, ErrorKind, TagIoError};
	///
	/// let err = TagIoError::new(ErrorKind::InvalidArgument(String::from("missing `path`")));
	/// assert_eq!(err.category(), ErrorCategory::InvalidArgument);
	/// ```
	pub fn category(&self) -> ErrorCategory {
		match self.kind {
			ErrorKind::InvalidArgument(_) | ErrorKind::Json(_) => ErrorCategory::InvalidArgument,
			ErrorKind::UnsupportedFormat
			| ErrorKind::UnsupportedGroup(_)
			| ErrorKind::Lofty(_)
			| ErrorKind::Io(_) => ErrorCategory::Io,
			ErrorKind::ResourceResolution(_) => ErrorCategory::ResourceResolution,
			ErrorKind::MalformedFrame(_) => ErrorCategory::MalformedFrame,
			ErrorKind::TaskFailed(_) => ErrorCategory::Internal,
		}
	}
}

impl std::error::Error for TagIoError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self.kind {
			ErrorKind::Json(ref err) => Some(err),
			ErrorKind::Lofty(ref err) => Some(err),
			ErrorKind::Io(ref err) => Some(err),
			ErrorKind::ResourceResolution(ResourceResolutionError {
				source: Some(ref err),
				..
			}) => Some(err),
			_ => None,
		}
	}
}

impl Debug for TagIoError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self.kind)
	}
}

impl From<ResourceResolutionError> for TagIoError {
	fn from(input: ResourceResolutionError) -> Self {
		Self {
			kind: ErrorKind::ResourceResolution(input),
		}
	}
}

impl From<MalformedFrameError> for TagIoError {
	fn from(input: MalformedFrameError) -> Self {
		Self {
			kind: ErrorKind::MalformedFrame(input),
		}
	}
}

impl From<LoftyError> for TagIoError {
	fn from(input: LoftyError) -> Self {
		Self {
			kind: ErrorKind::Lofty(input),
		}
	}
}

impl From<serde_json::Error> for TagIoError {
	fn from(input: serde_json::Error) -> Self {
		Self {
			kind: ErrorKind::Json(input),
		}
	}
}

impl From<std::io::Error> for TagIoError {
	fn from(input: std::io::Error) -> Self {
		Self {
			kind: ErrorKind::Io(input),
		}
	}
}

impl Display for TagIoError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.kind {
			// Conversions
			ErrorKind::Json(ref err) => write!(f, "Invalid request message: {err}"),
			ErrorKind::Lofty(ref err) => write!(f, "{err}"),
			ErrorKind::Io(ref err) => write!(f, "{err}"),

			ErrorKind::InvalidArgument(ref message) => write!(f, "Invalid argument: {message}"),
			ErrorKind::UnsupportedFormat => write!(
				f,
				"The file is not a supported container (expected MPEG or FLAC)"
			),
			ErrorKind::UnsupportedGroup(group) => write!(
				f,
				"Attempted to write `{group}` to a container that does not support it"
			),
			ErrorKind::ResourceResolution(ref err) => write!(f, "{err}"),
			ErrorKind::MalformedFrame(ref err) => write!(f, "{err}"),
			ErrorKind::TaskFailed(ref message) => write!(f, "Task failed: {message}"),
		}
	}
}
