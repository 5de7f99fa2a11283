//! Pagecheck Derive Macros: Structured Failure Rendering
//!
//! Failure messages render expected and actual values through the
//! `pagecheck::Describable` trait. This crate derives it for domain types,
//! so a failed comparison of two records reads
//! `Credentials { user="admin", tries=3 }` instead of a `Debug` dump.
//!
//! # Attributes
//!
//! - `#[describe(name = "...")]` on the type or a variant renames it
//! - `#[describe(name = "...")]` on a field renames the member
//! - `#[describe(skip)]` on a field leaves it out
//!
//! # Example
//!
//! ```ignore
//! use pagecheck::Describable;
//!
//! #[derive(Describable)]
//! struct Credentials {
//!     user: String,
//!     #[describe(skip)]
//!     password: String,
//!     #[describe(name = "tries")]
//!     attempts: u32,
//! }
//!
//! #[derive(Describable)]
//! enum Choice {
//!     OptionA,
//!     OptionB,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Fields, Ident, Index, Lit,
    Member, Meta,
};

/// Derive `pagecheck::Describable`.
///
/// Structs render as `Name { member=value, .. }`; members rendering as null
/// or as an empty list are left out, and a value with no remaining members
/// renders as its bare name. Unit enum variants render as their name; data
/// carrying variants render like structs named after the variant.
#[proc_macro_derive(Describable, attributes(describe))]
pub fn derive_describable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_describable(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_describable(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let type_name = extract_name_attribute(&input.attrs).unwrap_or_else(|| name.to_string());

    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param
            .bounds
            .push(parse_quote!(::pagecheck::describe::Describable));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data) => {
            let entries = extract_fields(&data.fields)
                .into_iter()
                .filter(|field| !field.skip)
                .map(|field| {
                    let label = &field.label;
                    let member = &field.member;
                    quote! { (#label, ::pagecheck::describe::Describable::describe(&self.#member)) }
                });
            quote! {
                ::pagecheck::describe::describe_struct(#type_name, &[#(#entries),*])
            }
        }
        Data::Enum(data) if data.variants.is_empty() => quote! { match *self {} },
        Data::Enum(data) => {
            let arms = data.variants.iter().map(|variant| {
                let ident = &variant.ident;
                let label = extract_name_attribute(&variant.attrs)
                    .unwrap_or_else(|| ident.to_string());
                variant_arm(ident, &label, &variant.fields)
            });
            quote! {
                match self {
                    #(#arms)*
                }
            }
        }
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "Describable cannot be derived for unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::pagecheck::describe::Describable for #name #ty_generics #where_clause {
            fn describe(&self) -> ::std::string::String {
                #body
            }
        }
    })
}

fn variant_arm(ident: &Ident, label: &str, fields: &Fields) -> TokenStream2 {
    let specs = extract_fields(fields);
    let bindings: Vec<Ident> = (0..specs.len())
        .map(|index| format_ident!("__field_{}", index))
        .collect();
    let entries = specs
        .iter()
        .zip(&bindings)
        .filter(|(field, _)| !field.skip)
        .map(|(field, binding)| {
            let field_label = &field.label;
            quote! { (#field_label, ::pagecheck::describe::Describable::describe(#binding)) }
        });
    let used = specs
        .iter()
        .zip(&bindings)
        .filter(|(field, _)| !field.skip);

    match fields {
        Fields::Unit => quote! {
            Self::#ident => ::std::string::String::from(#label),
        },
        Fields::Named(_) => {
            let patterns = used.map(|(field, binding)| {
                let member = &field.member;
                quote! { #member: #binding }
            });
            quote! {
                Self::#ident { #(#patterns,)* .. } =>
                    ::pagecheck::describe::describe_struct(#label, &[#(#entries),*]),
            }
        }
        Fields::Unnamed(_) => {
            let patterns = specs.iter().zip(&bindings).map(|(field, binding)| {
                if field.skip {
                    quote! { _ }
                } else {
                    quote! { #binding }
                }
            });
            quote! {
                Self::#ident(#(#patterns),*) =>
                    ::pagecheck::describe::describe_struct(#label, &[#(#entries),*]),
            }
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// One member of a struct or variant
struct FieldSpec {
    member: Member,
    label: String,
    skip: bool,
}

/// Extract the `name` attribute from `#[describe(name = "...")]`
fn extract_name_attribute(attrs: &[Attribute]) -> Option<String> {
    for attr in attrs {
        if attr.path().is_ident("describe") {
            if let Ok(Meta::NameValue(nv)) = attr.parse_args::<Meta>() {
                if nv.path.is_ident("name") {
                    if let syn::Expr::Lit(syn::ExprLit {
                        lit: Lit::Str(s), ..
                    }) = &nv.value
                    {
                        return Some(s.value());
                    }
                }
            }
        }
    }
    None
}

/// Whether `#[describe(skip)]` is present
fn has_skip_attribute(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("describe")
            && attr
                .parse_args::<Ident>()
                .map(|i| i == "skip")
                .unwrap_or(false)
    })
}

/// Extract members, labels and skip flags in declaration order
fn extract_fields(fields: &Fields) -> Vec<FieldSpec> {
    match fields {
        Fields::Named(named) => named
            .named
            .iter()
            .filter_map(|f| {
                let ident = f.ident.clone()?;
                let label = extract_name_attribute(&f.attrs).unwrap_or_else(|| ident.to_string());
                Some(FieldSpec {
                    member: Member::Named(ident),
                    label,
                    skip: has_skip_attribute(&f.attrs),
                })
            })
            .collect(),
        Fields::Unnamed(unnamed) => unnamed
            .unnamed
            .iter()
            .enumerate()
            .map(|(i, f)| FieldSpec {
                member: Member::Unnamed(Index::from(i)),
                label: extract_name_attribute(&f.attrs).unwrap_or_else(|| i.to_string()),
                skip: has_skip_attribute(&f.attrs),
            })
            .collect(),
        Fields::Unit => vec![],
    }
}
