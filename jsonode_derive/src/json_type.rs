use crate::args::{FieldArgs, StructArgs};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataStruct, DeriveInput, Fields, LitStr};

/// Expand `#[derive(JsonType)]` for a struct with named fields.
pub fn derive_struct(input: &DeriveInput, data: &DataStruct) -> syn::Result<TokenStream> {
	let Fields::Named(named) = &data.fields else {
		return Err(syn::Error::new_spanned(
			&input.ident,
			"JsonType can only be derived for structs with named fields",
		));
	};

	let struct_args = StructArgs::parse(&input.attrs)?;
	let name = &input.ident;
	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

	let mut properties = Vec::new();
	let mut parameters = Vec::new();
	let mut initializers = Vec::new();

	for field in &named.named {
		let Some(ident) = &field.ident else { continue };
		let ty = &field.ty;
		let args = FieldArgs::parse(&field.attrs)?;
		let field_name = LitStr::new(&ident.to_string(), ident.span());

		if struct_args.constructor {
			if args.ignore || args.extension_data {
				initializers.push(quote! { #ident: ::core::default::Default::default() });
			} else {
				let index = parameters.len();
				parameters.push(quote! { ::jsonode_core::ParameterShape::new::<#ty>(#field_name) });
				initializers.push(quote! { #ident: __args.take::<#ty>(#index)? });
			}
		}

		let mut property = if args.read_only {
			quote! {
				::jsonode_core::PropertyShape::read_only::<Self, #ty>(#field_name, |owner| &owner.#ident)
			}
		} else {
			quote! {
				::jsonode_core::PropertyShape::field::<Self, #ty>(
					#field_name,
					|owner| &owner.#ident,
					|owner| &mut owner.#ident,
					|owner, value| owner.#ident = value,
				)
			}
		};
		if let Some(rename) = &args.rename {
			property = quote! { #property.rename(#rename) };
		}
		if args.ignore {
			property = quote! { #property.ignore() };
		}
		if args.extension_data {
			property = quote! { #property.extension_data() };
		}
		if let Some(order) = &args.order {
			property = quote! { #property.order(#order) };
		}
		if !args.number_handling.is_empty() {
			let flags = &args.number_handling;
			property = quote! {
				#property.number_handling(
					[#(::jsonode_core::NumberHandling::#flags),*].into_iter().collect()
				)
			};
		}
		properties.push(property);
	}

	let construct = if struct_args.constructor {
		quote! {
			.constructor(
				::std::vec![#(#parameters),*],
				|__args| ::core::result::Result::Ok(Self { #(#initializers),* }),
			)
		}
	} else {
		quote! { .default_constructor(<Self as ::core::default::Default>::default) }
	};

	let callbacks = [
		("on_serializing", &struct_args.on_serializing),
		("on_serialized", &struct_args.on_serialized),
		("on_deserializing", &struct_args.on_deserializing),
		("on_deserialized", &struct_args.on_deserialized),
	]
	.into_iter()
	.filter_map(|(method, path)| {
		let method = syn::Ident::new(method, proc_macro2::Span::call_site());
		path.as_ref().map(|path| quote! { .#method(#path) })
	});

	Ok(quote! {
		impl #impl_generics ::jsonode_core::JsonType for #name #ty_generics #where_clause {
			fn type_shape() -> ::jsonode_core::TypeShape {
				::jsonode_core::ObjectShapeBuilder::<Self>::new()
					#construct
					#(.property(#properties))*
					#(#callbacks)*
					.build()
			}
		}
	})
}
