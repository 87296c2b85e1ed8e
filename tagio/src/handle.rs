//! Request-scoped references to external binary resources
//!
//! Large frame payloads (cover art, attached objects) are not inlined into write requests.
//! Instead, a frame carries a [`BinaryHandle`], and the request's [`BinaryHandleMap`] maps
//! that handle to a [`ResourceLocator`]. The map lives only as long as its write request.

use crate::error::{ResourceResolutionError, Result};
use crate::macros::invalid_arg;

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const FILE_URL_PREFIX: &str = "file://";

/// An opaque identifier linking a frame to an external resource
///
/// Handles are unique within a single write request, and mean nothing outside of it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BinaryHandle(u64);

impl BinaryHandle {
	/// Create a `BinaryHandle`
	pub const fn new(value: u64) -> Self {
		Self(value)
	}

	/// The raw handle value
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl Display for BinaryHandle {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// The location of an external resource
///
/// Locators are either plain filesystem paths, or `file://` URLs.
///
/// # Examples
///
/// ```rust
/// use tagio::handle::ResourceLocator;
/// use std::path::Path;
///
/// # fn main() -> tagio::error::Result<()> {
/// let url = ResourceLocator::parse("file:///music/cover.png")?;
/// assert_eq!(url.path(), Path::new("/music/cover.png"));
///
/// let path = ResourceLocator::parse("covers/back.jpg")?;
/// assert_eq!(path.path(), Path::new("covers/back.jpg"));
///
/// // Only local resources can be loaded
/// assert!(ResourceLocator::parse("https://example.com/cover.png").is_err());
/// # Ok(()) }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceLocator(PathBuf);

impl ResourceLocator {
	/// Parse a locator string
	///
	/// # Errors
	///
	/// * `locator` is empty
	/// * `locator` is a URL with a scheme other than `file`
	pub fn parse(locator: &str) -> Result<Self> {
		if let Some(path) = locator.strip_prefix(FILE_URL_PREFIX) {
			if path.is_empty() {
				invalid_arg!(@BAIL "empty `file://` locator");
			}

			return Ok(Self(PathBuf::from(path)));
		}

		if locator.is_empty() {
			invalid_arg!(@BAIL "empty resource locator");
		}

		if let Some((scheme, _)) = locator.split_once("://") {
			if !scheme.is_empty() && scheme.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'+') {
				invalid_arg!(@BAIL "unsupported locator scheme `{scheme}`, only `file` is supported");
			}
		}

		Ok(Self(PathBuf::from(locator)))
	}

	/// The filesystem path of the resource
	pub fn path(&self) -> &Path {
		&self.0
	}

	/// Read the resource in full
	///
	/// # Errors
	///
	/// * The resource is missing or unreadable
	pub(crate) fn load(&self, handle: Option<BinaryHandle>) -> Result<Vec<u8>> {
		log::trace!("Loading binary resource `{}`", self.0.display());

		std::fs::read(&self.0).map_err(|e| {
			ResourceResolutionError::unreadable(handle, self.0.clone(), e).into()
		})
	}
}

/// Format `path` as a `file://` URL, making it absolute first
pub(crate) fn file_url(path: &Path) -> std::io::Result<String> {
	let absolute = std::path::absolute(path)?;
	Ok(format!("{FILE_URL_PREFIX}{}", absolute.display()))
}

/// A table of [`BinaryHandle`] → [`ResourceLocator`] for a single write request
///
/// Handles come from two places:
///
/// * The caller assigns them, and provides the locator in the request's `resources` table
/// * The request contains an inline locator, which is registered under a freshly generated handle
///
/// # Examples
///
/// ```rust
/// use tagio::handle::{BinaryHandle, BinaryHandleMap, ResourceLocator};
///
/// # fn main() -> tagio::error::Result<()> {
/// let mut map = BinaryHandleMap::new();
/// map.insert(BinaryHandle::new(0), ResourceLocator::parse("front.png")?)?;
///
/// // Generated handles never collide with caller handles
/// let generated = map.register(ResourceLocator::parse("back.png")?)?;
/// assert_ne!(generated, BinaryHandle::new(0));
///
/// assert!(map.resolve(generated).is_ok());
/// assert!(map.resolve(BinaryHandle::new(42)).is_err());
/// # Ok(()) }
/// ```
#[derive(Clone, Debug, Default)]
pub struct BinaryHandleMap {
	entries: BTreeMap<BinaryHandle, ResourceLocator>,
	next: u64,
	// `next` has passed `u64::MAX`
	exhausted: bool,
}

impl BinaryHandleMap {
	/// Create an empty `BinaryHandleMap`
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a caller-assigned handle
	///
	/// # Errors
	///
	/// * `handle` is already present in the map
	pub fn insert(&mut self, handle: BinaryHandle, locator: ResourceLocator) -> Result<()> {
		if self.entries.contains_key(&handle) {
			invalid_arg!(@BAIL "duplicate binary handle {handle}");
		}

		self.entries.insert(handle, locator);
		Ok(())
	}

	/// Register a locator under a newly generated handle
	///
	/// Generated handles count up from the highest handle seen so far.
	///
	/// # Errors
	///
	/// * Every handle above the highest reserved handle is taken
	pub fn register(&mut self, locator: ResourceLocator) -> Result<BinaryHandle> {
		let handle = loop {
			if self.exhausted {
				invalid_arg!(@BAIL "no binary handles are left to generate");
			}

			let candidate = BinaryHandle(self.next);
			self.advance();

			if !self.entries.contains_key(&candidate) {
				break candidate;
			}
		};

		self.entries.insert(handle, locator);
		Ok(handle)
	}

	/// Keep generated handles from ever taking `handle`
	///
	/// Used for handles that are referenced, but may not be present in the map.
	pub(crate) fn reserve(&mut self, handle: BinaryHandle) {
		if self.exhausted || handle.0 < self.next {
			return;
		}

		self.next = handle.0;
		self.advance();
	}

	fn advance(&mut self) {
		match self.next.checked_add(1) {
			Some(next) => self.next = next,
			None => self.exhausted = true,
		}
	}

	/// Get the locator of a handle
	///
	/// # Errors
	///
	/// * `handle` is not present in the map
	pub fn resolve(&self, handle: BinaryHandle) -> Result<&ResourceLocator> {
		self.entries
			.get(&handle)
			.ok_or_else(|| ResourceResolutionError::unknown_handle(handle).into())
	}

	/// Resolve a handle and read its resource
	///
	/// # Errors
	///
	/// * See [`BinaryHandleMap::resolve`]
	/// * The resource is missing or unreadable
	pub fn load(&self, handle: BinaryHandle) -> Result<Vec<u8>> {
		self.resolve(handle)?.load(Some(handle))
	}

	/// Whether `handle` is present in the map
	pub fn contains(&self, handle: BinaryHandle) -> bool {
		self.entries.contains_key(&handle)
	}

	/// The number of registered handles
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the map is empty
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
