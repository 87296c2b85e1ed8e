//! The full-replace rewrite of a frame-based tag
//!
//! Given an ordered list of descriptors:
//!
//! 1. Every binary payload is resolved, and every descriptor is built and normalized
//!    (see `normalize`). Any failure here aborts the rewrite,
//!    leaving the destination tag untouched.
//! 2. All existing frames sharing an ID with *any* descriptor are removed.
//! 3. The normalized frames are inserted, in order.
//!
//! Frames whose ID does not appear in the list are never removed, so a rewrite is only a full
//! replacement for the IDs it mentions.

use super::build::build_frame;
use super::normalize::normalize;
use super::{FrameDescriptor, Payload};
use crate::config::FrameVersion;
use crate::error::Result;
use crate::handle::{BinaryHandleMap, ResourceLocator};

use std::collections::BTreeSet;

use lofty::id3::v2::Id3v2Tag;

pub(crate) fn rewrite_frames(
	tag: &mut Id3v2Tag,
	descriptors: Vec<FrameDescriptor>,
	handles: &BinaryHandleMap,
	version: FrameVersion,
) -> Result<()> {
	let ids = descriptors
		.iter()
		.map(|descriptor| descriptor.frame_id().into_owned())
		.collect::<BTreeSet<_>>();

	let mut staged = Vec::with_capacity(descriptors.len());
	for descriptor in descriptors {
		let payload = match descriptor.payload() {
			Some(payload) => Some(resolve_payload(payload, handles)?),
			None => None,
		};

		let frame = build_frame(&descriptor, payload, version)?;
		staged.extend(normalize(frame, version)?);
	}

	// Surviving frames keep their relative order
	let mut removed = 0_usize;
	tag.retain(|frame| {
		let keep = !ids.contains(frame.id_str());
		if !keep {
			removed += 1;
		}

		keep
	});

	if removed > 0 {
		log::debug!("Removed {removed} existing frame(s) sharing an ID with the new frames");
	}

	log::debug!("Inserting {} frame(s)", staged.len());
	for frame in staged {
		if let Some(replaced) = tag.insert(frame) {
			log::trace!("Replaced a duplicate `{}` frame", replaced.id_str());
		}
	}

	Ok(())
}

fn resolve_payload(payload: &Payload, handles: &BinaryHandleMap) -> Result<Vec<u8>> {
	match payload {
		Payload::Data(data) => Ok(data.clone()),
		Payload::Handle(handle) => handles.load(*handle),
		Payload::Locator(locator) => ResourceLocator::parse(locator)?.load(None),
	}
}
