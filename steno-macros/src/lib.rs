//! The `stroke!()` macro.
//!
//! Converts a steno stroke in textual format into its internal integer
//! representation at compile time, so tests and dictionary tools can write
//! `stroke!("KAT")` instead of parsing text at runtime.

use proc_macro::TokenStream;
use quote::quote;
use steno_engine::Stroke;
use syn::{parse_macro_input, LitStr};

#[proc_macro]
pub fn stroke(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as LitStr);

    let stroke = match Stroke::from_text(&input.value()) {
        Ok(s) => s,
        Err(e) => {
            return syn::Error::new(input.span(), format!("{:?}", e))
                .into_compile_error()
                .into();
        }
    };

    let raw = stroke.into_raw();
    let expanded = quote! {
        ::steno_engine::Stroke::from_raw(#raw)
    };

    TokenStream::from(expanded)
}
