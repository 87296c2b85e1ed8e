//! The supplementary tag (APEv2)

use crate::container::AudioFile;
use crate::error::Result;
use crate::message::FieldMap;

use lofty::ape::{ApeItem, ApeTag};
use lofty::tag::ItemValue;

pub(crate) fn export(file: &AudioFile) -> Option<FieldMap> {
	file.ape().map(fields)
}

fn fields(tag: &ApeTag) -> FieldMap {
	let mut fields = FieldMap::new();
	for item in tag {
		match item.value() {
			ItemValue::Text(value) | ItemValue::Locator(value) => {
				fields.insert(String::from(item.key()), value.clone());
			},
			ItemValue::Binary(_) => {
				log::debug!("Skipping binary APE item `{}`", item.key());
			},
		}
	}

	fields
}

/// Replace the item under each requested key
///
/// Keys are case-insensitive. An empty value only removes the key.
pub(crate) fn import(file: &mut AudioFile, fields: &FieldMap) -> Result<()> {
	file.with_ape(|tag| replace(tag, fields))
}

fn replace(tag: &mut ApeTag, fields: &FieldMap) -> Result<()> {
	for (key, value) in fields {
		tag.remove(key);

		if value.is_empty() {
			continue;
		}

		tag.insert(ApeItem::new(key.clone(), ItemValue::Text(value.clone()))?);
	}

	Ok(())
}
