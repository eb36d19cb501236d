use proc_macro2::TokenStream;
use syn::{
	Attribute, Expr, Ident, LitStr, Path, Token,
	parse::{Parse, ParseStream},
	punctuated::Punctuated,
};

/// Arguments of `#[context(...)]`: an optional leading `move` followed by `format!` arguments.
#[derive(Debug)]
pub struct ContextArgs {
	pub move_token: Option<Token![move]>,
	pub format_args: TokenStream,
}

impl Parse for ContextArgs {
	fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
		let move_token = if input.peek(Token![move]) {
			let token = input.parse()?;
			if !input.is_empty() {
				input.parse::<Token![,]>()?;
			}
			Some(token)
		} else {
			None
		};
		Ok(Self {
			move_token,
			format_args: input.parse()?,
		})
	}
}

/// Options of `#[json(...)]` on the struct.
#[derive(Debug, Default)]
pub struct StructArgs {
	pub constructor: bool,
	pub on_serializing: Option<Path>,
	pub on_serialized: Option<Path>,
	pub on_deserializing: Option<Path>,
	pub on_deserialized: Option<Path>,
}

/// Options of `#[json(...)]` on a field.
#[derive(Debug, Default)]
pub struct FieldArgs {
	pub rename: Option<String>,
	pub ignore: bool,
	pub read_only: bool,
	pub extension_data: bool,
	pub order: Option<Expr>,
	pub number_handling: Vec<Ident>,
}

impl StructArgs {
	pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
		let mut args = Self::default();
		for attr in attrs.iter().filter(|attr| attr.path().is_ident("json")) {
			attr.parse_nested_meta(|meta| {
				if meta.path.is_ident("constructor") {
					args.constructor = true;
				} else if meta.path.is_ident("on_serializing") {
					args.on_serializing = Some(meta.value()?.parse()?);
				} else if meta.path.is_ident("on_serialized") {
					args.on_serialized = Some(meta.value()?.parse()?);
				} else if meta.path.is_ident("on_deserializing") {
					args.on_deserializing = Some(meta.value()?.parse()?);
				} else if meta.path.is_ident("on_deserialized") {
					args.on_deserialized = Some(meta.value()?.parse()?);
				} else {
					return Err(meta.error("unknown json attribute on a struct"));
				}
				Ok(())
			})?;
		}
		Ok(args)
	}
}

impl FieldArgs {
	pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
		let mut args = Self::default();
		for attr in attrs.iter().filter(|attr| attr.path().is_ident("json")) {
			attr.parse_nested_meta(|meta| {
				if meta.path.is_ident("rename") {
					args.rename = Some(meta.value()?.parse::<LitStr>()?.value());
				} else if meta.path.is_ident("ignore") {
					args.ignore = true;
				} else if meta.path.is_ident("read_only") {
					args.read_only = true;
				} else if meta.path.is_ident("extension_data") {
					args.extension_data = true;
				} else if meta.path.is_ident("order") {
					args.order = Some(meta.value()?.parse()?);
				} else if meta.path.is_ident("number_handling") {
					let content;
					syn::parenthesized!(content in meta.input);
					let flags = Punctuated::<Ident, Token![,]>::parse_terminated(&content)?;
					args.number_handling.extend(flags);
				} else {
					return Err(meta.error("unknown json attribute on a field"));
				}
				Ok(())
			})?;
		}
		if args.ignore && (args.extension_data || args.rename.is_some()) {
			return Err(syn::Error::new_spanned(
				&attrs[0],
				"an ignored field cannot be renamed or hold extension data",
			));
		}
		Ok(args)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use quote::ToTokens;
	use syn::{parse_quote, parse_str};

	#[test]
	fn test_context_args() {
		let args: ContextArgs = parse_str(r#""while reading {}", name"#).unwrap();
		assert!(args.move_token.is_none());
		assert_eq!(args.format_args.to_string(), r#""while reading {}" , name"#);

		let args: ContextArgs = parse_str(r#"move, "done""#).unwrap();
		assert!(args.move_token.is_some());

		let args: ContextArgs = parse_str("move").unwrap();
		assert!(args.move_token.is_some());
		assert!(args.format_args.is_empty());

		let err = parse_str::<ContextArgs>("move \"x\"").unwrap_err();
		assert!(err.to_string().contains(','), "{err}");
	}

	#[test]
	fn test_struct_args() {
		let attrs: Vec<Attribute> = vec![
			parse_quote!(#[json(constructor)]),
			parse_quote!(#[json(on_deserialized = Self::validate)]),
			parse_quote!(#[doc = "ignored"]),
		];
		let args = StructArgs::parse(&attrs).unwrap();
		assert!(args.constructor);
		assert_eq!(args.on_deserialized.unwrap().to_token_stream().to_string(), "Self :: validate");
		assert!(args.on_serializing.is_none());
	}

	#[test]
	fn test_field_args() {
		let attrs: Vec<Attribute> = vec![parse_quote!(
			#[json(rename = "id", order = -1, number_handling(AllowReadingFromString, WriteAsString))]
		)];
		let args = FieldArgs::parse(&attrs).unwrap();
		assert_eq!(args.rename.as_deref(), Some("id"));
		assert_eq!(args.order.unwrap().to_token_stream().to_string(), "- 1");
		assert_eq!(args.number_handling.len(), 2);
		assert!(!args.ignore);
	}

	#[test]
	fn test_unknown_attribute() {
		let attrs: Vec<Attribute> = vec![parse_quote!(#[json(flatten)])];
		let err = FieldArgs::parse(&attrs).unwrap_err();
		assert!(err.to_string().contains("unknown json attribute"), "{err}");
	}

	#[test]
	fn test_ignored_extension_data() {
		let attrs: Vec<Attribute> = vec![parse_quote!(#[json(ignore, extension_data)])];
		assert!(FieldArgs::parse(&attrs).is_err());
	}
}
