use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, LitStr, parse_macro_input};

/// Options parsed from `#[singleton(...)]` attributes.
#[derive(Default)]
struct Options {
    persist: bool,
    name: Option<LitStr>,
}

fn parse_options(ast: &DeriveInput) -> syn::Result<Options> {
    let mut options = Options::default();
    for attr in ast.attrs.iter().filter(|a| a.path().is_ident("singleton")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("persist") {
                options.persist = true;
                Ok(())
            } else if meta.path.is_ident("name") {
                options.name = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unsupported singleton option, expected `persist` or `name`"))
            }
        })?;
    }
    Ok(options)
}

pub fn derive_singleton(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let options = match parse_options(&ast) {
        Ok(options) => options,
        Err(err) => return err.to_compile_error().into(),
    };

    let struct_name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let persist = options.persist;
    let name = options.name.map(|name| {
        quote! {
            fn name() -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Borrowed(#name)
            }
        }
    });

    TokenStream::from(quote! {
        impl #impl_generics ::rusty_singleton::singleton::Singleton for #struct_name #ty_generics #where_clause {
            const PERSIST_BETWEEN_SCENES: bool = #persist;
            #name
        }
    })
}
