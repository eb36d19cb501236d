//! Binding of constructor parameters to properties.

use super::TypeKey;
use crate::error::JsonError;
use anyhow::Result;
use log::debug;

pub struct BindingParameter<'a> {
	pub name: &'a str,
	pub parameter_type: TypeKey,
}

pub struct BindingProperty<'a> {
	pub name: &'a str,
	pub property_type: TypeKey,
	pub extension_data: bool,
}

/// Bind each parameter to the property with the same name (ignoring case) and the same type.
///
/// Returns the index of the bound property per parameter. Parameters matching no property stay
/// unbound. A parameter matching several properties, or the extension data property, is a
/// configuration error.
pub fn bind_parameters(
	owner: &str,
	parameters: &[BindingParameter],
	properties: &[BindingProperty],
) -> Result<Vec<Option<usize>>> {
	parameters
		.iter()
		.map(|parameter| {
			let name = parameter.name.to_lowercase();
			let mut matches = properties
				.iter()
				.enumerate()
				.filter(|(_, property)| property.property_type == parameter.parameter_type && property.name.to_lowercase() == name);
			let Some((index, property)) = matches.next() else {
				debug!("constructor parameter '{}' of {owner} is not bound to a property", parameter.name);
				return Ok(None);
			};
			if matches.next().is_some() {
				return Err(JsonError::configuration(format!(
					"constructor parameter '{}' of {owner} matches more than one property",
					parameter.name
				))
				.into());
			}
			if property.extension_data {
				return Err(JsonError::configuration(format!(
					"constructor parameter '{}' of {owner} cannot bind to the extension data property",
					parameter.name
				))
				.into());
			}
			Ok(Some(index))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::{ErrorKind, error_kind};

	fn parameter(name: &str, parameter_type: TypeKey) -> BindingParameter<'_> {
		BindingParameter { name, parameter_type }
	}

	fn property(name: &str, property_type: TypeKey) -> BindingProperty<'_> {
		BindingProperty {
			name,
			property_type,
			extension_data: false,
		}
	}

	#[test]
	fn test_binds_by_name_and_type() -> Result<()> {
		let int = TypeKey::of::<i32>();
		let string = TypeKey::of::<String>();
		let bound = bind_parameters(
			"Owner",
			&[parameter("id", int), parameter("NAME", string), parameter("id_text", string), parameter("count", string)],
			&[property("Name", string), property("Id", int), property("count", int)],
		)?;
		assert_eq!(bound, vec![Some(1), Some(0), None, None]);
		Ok(())
	}

	#[test]
	fn test_ambiguous_binding() {
		let int = TypeKey::of::<i32>();
		let err = bind_parameters(
			"Owner",
			&[parameter("value", int)],
			&[property("Value", int), property("value", int)],
		)
		.unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::Configuration));
		assert!(err.to_string().contains("'value' of Owner"));
	}

	#[test]
	fn test_extension_data_binding() {
		let key = TypeKey::of::<u8>();
		let err = bind_parameters(
			"Owner",
			&[parameter("extra", key)],
			&[BindingProperty {
				name: "extra",
				property_type: key,
				extension_data: true,
			}],
		)
		.unwrap_err();
		assert_eq!(error_kind(&err), Some(ErrorKind::Configuration));
	}
}
