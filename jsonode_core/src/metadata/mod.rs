//! Type descriptors: how each type is read and written under a given set of options.
//!
//! A type describes itself through [`JsonType::type_shape`]. The first time a type is used with
//! some [`SerializerOptions`](crate::SerializerOptions), its shape is resolved into a
//! [`TypeDescriptor`] (naming policy applied, properties ordered, constructor parameters bound)
//! and cached in the options.

mod binding;
mod cache;
mod descriptor;
mod json_type;
mod property;
mod shape;

pub use binding::{BindingParameter, BindingProperty, bind_parameters};
pub use cache::DescriptorCache;
pub use descriptor::*;
pub use json_type::{ConverterFactory, JsonType, TypeKey, TypeShape};
pub use property::PropertyAccessor;
pub use shape::{ConstructorArgs, ObjectShape, ObjectShapeBuilder, ParameterShape, PropertyShape};
