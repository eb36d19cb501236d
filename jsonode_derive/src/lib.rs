//! Derive macro for `jsonode_core::JsonType`.

mod args;
mod context;
mod json_type;

use args::ContextArgs;
use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, parse_macro_input};

/// Describe a struct with named fields as a JSON object.
///
/// Struct attributes, all inside `#[json(...)]`:
/// - `constructor`: build instances from the fields as constructor parameters instead of
///   `Default::default()` followed by setters.
/// - `on_serializing = path`, `on_serialized = path`, `on_deserializing = path`,
///   `on_deserialized = path`: callbacks taking `&Self` (serialization) or `&mut Self`
///   (deserialization).
///
/// Field attributes:
/// - `rename = "name"`, `ignore`, `order = n`, `extension_data`, `read_only`
/// - `number_handling(AllowReadingFromString, WriteAsString, AllowNamedFloatingPointLiterals)`
#[proc_macro_derive(JsonType, attributes(json))]
pub fn derive_json_type(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);

	let expanded = match &input.data {
		syn::Data::Struct(data) => json_type::derive_struct(&input, data),
		_ => Err(syn::Error::new_spanned(
			&input.ident,
			"JsonType can only be derived for structs with named fields",
		)),
	};

	expanded.unwrap_or_else(syn::Error::into_compile_error).into()
}

/// Wrap the error of a function returning a `Result` with a formatted context message.
///
/// ```ignore
/// #[context("while reading {path:?}")]
/// fn read(path: &Path) -> Result<Vec<u8>> { ... }
/// ```
///
/// The body runs in a closure (or an async block for `async fn`). Start the arguments with
/// `move` to move captured values into it. Without a message the context names the function.
#[proc_macro_attribute]
pub fn context(args: TokenStream, input: TokenStream) -> TokenStream {
	let args = parse_macro_input!(args as ContextArgs);
	let function = parse_macro_input!(input as ItemFn);
	context::expand(&args, function)
		.unwrap_or_else(syn::Error::into_compile_error)
		.into()
}
