//! Partial updates over typed resources.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, partner::FieldMap};

/// Assigns every top-level field of `patch` onto `resource`, leaving other fields alone.
///
/// Fields the type does not model are kept in its flattened `extra` map. A value that does
/// not fit the field's type fails with [`Error::InvalidRequest`] and leaves `resource`
/// untouched.
pub fn apply_patch<T>(resource: &mut T, patch: &FieldMap) -> Result<()>
where
	T: Serialize + DeserializeOwned,
{
	if patch.is_empty() {
		return Ok(());
	}

	let mut fields = match serde_json::to_value(&*resource) {
		Ok(JsonValue::Object(fields)) => fields,
		Ok(_) => return Err(invalid("resource does not serialize to a JSON object".into())),
		Err(e) => return Err(invalid(format!("resource cannot be serialized: {e}"))),
	};

	for (key, value) in patch {
		fields.insert(key.clone(), value.clone());
	}

	*resource = serde_path_to_error::deserialize(JsonValue::Object(fields))
		.map_err(|e| invalid(format!("field `{}` cannot be applied: {}", e.path(), e.inner())))?;

	Ok(())
}

/// [`apply_patch`] on a default value.
pub fn from_fields<T>(fields: &FieldMap) -> Result<T>
where
	T: Default + Serialize + DeserializeOwned,
{
	let mut resource = T::default();

	apply_patch(&mut resource, fields)?;

	Ok(resource)
}

fn invalid(reason: String) -> Error {
	Error::InvalidRequest { reason }
}
