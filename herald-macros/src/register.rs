//! `#[auto_register]` - attribute form of `register_handler!`.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{
    DeriveInput, Expr, Ident, Path, Token, Type,
    parse::{Parse, ParseStream},
};

/// Arguments for the `#[auto_register]` macro.
pub(crate) struct AutoRegisterArgs {
    /// Message types the handler is registered under.
    pub messages: Vec<Type>,
    /// Explicit module name.
    pub module: Option<Expr>,
    /// Fallible constructor used instead of `Default`.
    pub constructor: Option<Path>,
}

impl Parse for AutoRegisterArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut messages = Vec::new();
        let mut module = None;
        let mut constructor = None;

        while !input.is_empty() {
            if input.peek(Ident) && input.peek2(Token![=]) {
                let ident: Ident = input.parse()?;
                input.parse::<Token![=]>()?;

                match ident.to_string().as_str() {
                    "module" if module.is_none() => module = Some(input.parse()?),
                    "constructor" if constructor.is_none() => constructor = Some(input.parse()?),
                    "module" | "constructor" => {
                        return Err(syn::Error::new(
                            ident.span(),
                            format!("duplicate argument: {ident}"),
                        ));
                    }
                    other => {
                        return Err(syn::Error::new(
                            ident.span(),
                            format!("unknown argument: {other}"),
                        ));
                    }
                }
            } else {
                messages.push(input.parse()?);
            }

            if input.is_empty() {
                break;
            }
            input.parse::<Token![,]>()?;
        }

        if messages.is_empty() {
            return Err(syn::Error::new(
                Span::call_site(),
                "expected at least one message type: #[auto_register(MyMessage)]",
            ));
        }

        Ok(AutoRegisterArgs {
            messages,
            module,
            constructor,
        })
    }
}

pub(crate) fn expand(args: AutoRegisterArgs, input: DeriveInput) -> syn::Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "generic handlers cannot be auto-registered; register a concrete type instead",
        ));
    }

    let name = &input.ident;
    let messages = &args.messages;

    let options = match (&args.module, &args.constructor) {
        (Some(module), Some(constructor)) => {
            quote! { ; module = #module, constructor = #constructor }
        }
        (Some(module), None) => quote! { ; module = #module },
        (None, Some(constructor)) => quote! { ; constructor = #constructor },
        (None, None) => quote! {},
    };

    Ok(quote! {
        #input

        ::herald::register_handler!(#name => #(#messages),* #options);
    })
}
