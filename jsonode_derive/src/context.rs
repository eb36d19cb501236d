use crate::args::ContextArgs;
use proc_macro2::{Ident, Span, TokenStream};
use quote::{ToTokens, quote};
use syn::{Expr, ItemFn, ReturnType, Stmt, Type};

/// The `Result` type a function returns, if it returns one.
fn result_type(output: &ReturnType) -> Option<&Type> {
	let ReturnType::Type(_, ty) = output else {
		return None;
	};
	match ty.as_ref() {
		Type::Path(path) if path.path.segments.last().is_some_and(|segment| segment.ident == "Result") => {
			Some(ty)
		}
		_ => None,
	}
}

/// Without arguments the message names the function.
fn message(args: &ContextArgs, function: &ItemFn) -> TokenStream {
	if args.format_args.is_empty() {
		let text = format!("while calling {}", function.sig.ident);
		quote! { ::std::string::String::from(#text) }
	} else {
		let format_args = &args.format_args;
		quote! { format!(#format_args) }
	}
}

/// Run the body of `function` in its own scope and add the context message to its error.
pub fn expand(args: &ContextArgs, mut function: ItemFn) -> syn::Result<TokenStream> {
	let Some(result_type) = result_type(&function.sig.output).cloned() else {
		return Err(syn::Error::new_spanned(
			&function.sig,
			"#[context] can only be used on functions returning a Result",
		));
	};

	let body = &function.block;
	let move_token = &args.move_token;
	let run = if function.sig.asyncness.is_some() {
		quote! { async #move_token #body.await }
	} else {
		// capturing a value that is not Copy makes the closure FnOnce
		let once = Ident::new("once", Span::mixed_site());
		quote! {
			{
				let #once = ::core::iter::empty::<()>();
				(#move_token || -> #result_type {
					::core::mem::drop(#once);
					#body
				})()
			}
		}
	};

	let message = message(args, &function);
	let result = Ident::new("result", Span::mixed_site());
	let err = Ident::new("err", Span::mixed_site());
	let wrapped = quote! {
		let #result: #result_type = #run;
		#result.map_err(|#err| #err.context(#message).into())
	};
	function.block.stmts = vec![Stmt::Expr(Expr::Verbatim(wrapped), None)];
	Ok(function.into_token_stream())
}
