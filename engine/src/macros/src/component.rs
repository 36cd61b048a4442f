use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

pub fn derive_component(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let struct_name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    // Resolves inside the crate through `extern crate self as rusty_singleton;` in lib.rs.
    TokenStream::from(quote! {
        impl #impl_generics ::rusty_singleton::scene::Component for #struct_name #ty_generics #where_clause {
        }
    })
}
