use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

mod register;

/// Derive macro for implementing `Message` trait.
#[proc_macro_derive(Message)]
pub fn derive_message(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::herald::Message for #name #ty_generics #where_clause {}
    };

    TokenStream::from(expanded)
}

/// Mark a handler type for auto-registration under one or more message types.
///
/// Expands to the item itself followed by `herald::register_handler!`.
///
/// # Arguments
///
/// - message types (at least one): `#[auto_register(OrderCreated, PaymentReceived)]`
/// - `module = "name"`: module to register under, defaults to the crate name
/// - `constructor = path`: a `fn() -> Result<Self, E>` used instead of `Default`
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Default)]
/// #[auto_register(OrderCreated, module = "billing")]
/// struct Mailer;
///
/// impl Handler<OrderCreated> for Mailer {
///     fn handle(&self, order: &OrderCreated) -> HandleResult { Ok(()) }
/// }
/// ```
#[proc_macro_attribute]
pub fn auto_register(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as register::AutoRegisterArgs);
    let input = parse_macro_input!(item as DeriveInput);

    register::expand(args, input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
