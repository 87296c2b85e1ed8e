//! Asynchronous audio tag marshalling and rewrite engine.
//!
//! TagIO reads and writes the metadata of MPEG and FLAC files, exchanging it with callers as
//! serializable messages. Metadata is split into independently gated [tag groups](config::TagGroup):
//!
//! | Group                | Message key        | MPEG       | FLAC       |
//! |----------------------|--------------------|------------|------------|
//! | Generic tag          | `tag`              | read/write | read/write |
//! | Audio properties     | `audioProperties`  | read       | read       |
//! | Legacy tag (ID3v1)   | `legacyTag`        | read/write |            |
//! | Frame tag (ID3v2)    | `frameTag`         | read/write | read       |
//! | Comment block        | `commentBlock`     |            | read/write |
//! | Supplementary (APE)  | `supplementaryTag` | read/write |            |
//!
//! Requests are validated when they are built, then run as two-phase [tasks](task): the file work
//! happens on a worker pool, and the callback runs on the caller's thread.
//!
//! # Examples
//!
//! ## Reading a file
//!
//! ```rust,no_run
//! # fn main() -> tagio::error::Result<()> {
//! use tagio::Engine;
//! use tagio::config::{Configuration, TagGroup};
//! use tagio::request::ReadRequest;
//!
//! let mut engine = Engine::new()?;
//!
//! // Skip the ID3v1 tag
//! let configuration = Configuration::new().readable(TagGroup::Legacy, false);
//! let request = ReadRequest::new("song.mp3", configuration)?;
//!
//! engine.read(request, |result| {
//! 	let response = result.expect("read failed");
//! 	assert!(response.legacy_tag.is_none());
//! });
//!
//! engine.run_until_idle();
//! # Ok(())
//! # }
//! ```
//!
//! ## Rewriting frames
//!
//! Frames are written with *full-replace* semantics: every existing frame sharing an ID with any
//! requested frame is removed first. Frames with other IDs are left as they are.
//!
//! ```rust,no_run
//! # fn main() -> tagio::error::Result<()> {
//! use tagio::Engine;
//!
//! let mut engine = Engine::new()?;
//!
//! engine.write_message(
//! 	r#"{
//! 		"path": "song.mp3",
//! 		"frameTag": [
//! 			{ "kind": "text", "id": "TIT2", "text": "Foo title" },
//! 			{ "kind": "picture", "pictureType": 3, "mimeType": "image/png", "payload": { "handle": 0 } }
//! 		],
//! 		"resources": { "0": "covers/front.png" }
//! 	}"#,
//! 	|result| {
//! 		if let Err(e) = result {
//! 			eprintln!("{e}");
//! 		}
//! 	},
//! )?;
//!
//! engine.run_until_idle();
//! # Ok(())
//! # }
//! ```

mod codec;
pub mod config;
pub mod container;
mod engine;
pub mod error;
pub mod frame;
pub mod handle;
pub(crate) mod macros;
pub mod message;
pub mod request;
pub mod response;
mod snapshot;
pub mod task;

pub use engine::Engine;
