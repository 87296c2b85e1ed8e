use crate::frame::FrameDescriptor;
use crate::message::{AudioProperties, FieldListMap, FieldMap, TagFields};

/// The metadata extracted from a container at one point in time
///
/// A group is `Some` only if it was readable *and* present in the container. Snapshots are
/// built in the background phase of a task, and consumed by its foreground phase.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct TagSnapshot {
	pub(crate) path: String,
	pub(crate) audio_properties: Option<AudioProperties>,
	pub(crate) tag: Option<TagFields>,
	pub(crate) legacy_tag: Option<TagFields>,
	pub(crate) frame_tag: Option<Vec<FrameDescriptor>>,
	pub(crate) comment_block: Option<FieldListMap>,
	pub(crate) supplementary_tag: Option<FieldMap>,
}

impl TagSnapshot {
	pub(crate) fn new(path: String) -> Self {
		Self {
			path,
			..Self::default()
		}
	}
}
