//! `#[derive(Json)]`: generates `FromJson`/`ToJson` impls for a product
//! type (struct with named fields, rule 13) or an
//! enumerated type (fieldless enum, rule 4).
//!
//! `parse_macro_input!` into a `syn` item, walk its fields/variants,
//! emit one `quote!` block per generated impl.
//!
//! Generated code always references the crate root as `::json_bind::…`;
//! `json_bind`'s own `lib.rs` does `extern crate self as json_bind` so
//! this also resolves from the core crate's own tests.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Data, DataEnum, DeriveInput, Fields, FieldsNamed, Generics, Ident, LitStr,
    Type,
};

#[proc_macro_derive(Json, attributes(json))]
pub fn derive_json(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident.clone();

    let expanded = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => derive_product(&name, &input.generics, fields),
            _ => syn::Error::new_spanned(
                &name,
                "#[derive(Json)] only supports structs with named fields",
            )
            .to_compile_error(),
        },
        Data::Enum(data) => derive_enum(&name, &input.generics, data),
        Data::Union(_) => {
            syn::Error::new_spanned(&name, "#[derive(Json)] does not support unions")
                .to_compile_error()
        }
    };

    expanded.into()
}

/// `#[json(rename = "...")]` on a field or a unit variant.
fn field_rename(attrs: &[syn::Attribute]) -> Option<String> {
    let mut rename = None;
    for attr in attrs {
        if !attr.path().is_ident("json") {
            continue;
        }
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value = meta.value()?;
                let lit: LitStr = value.parse()?;
                rename = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unsupported #[json(...)] attribute"))
            }
        });
    }
    rename
}

/// If `ty` is `Option<Inner>`, returns `Inner`; otherwise `None`.
fn option_inner(ty: &Type) -> Option<Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner.clone()),
        _ => None,
    }
}

struct FieldPlan {
    ident: Ident,
    ty: Type,
    key: String,
    /// `Some(inner)` when `ty` is `Option<inner>` (single presence level:
    /// "field absent" and "field present-with-null" both
    /// collapse to `None`, since a bare `Option<T>` has no third state).
    single_optional: Option<Type>,
    /// `Some(inner)` when `ty` is `Option<Option<inner>>` (double
    /// Option: the idiomatic Rust realization of full presence-vs-nullity
    /// tracking — outer `None` is "absent", `Some(None)` is "present and
    /// null", `Some(Some(v))` is "present with a value").
    double_optional: Option<Type>,
}

fn plan_fields(fields: &FieldsNamed) -> Vec<FieldPlan> {
    fields
        .named
        .iter()
        .map(|f| {
            let ident = f.ident.clone().expect("FieldsNamed always has idents");
            let rename = field_rename(&f.attrs);
            let key = rename.unwrap_or_else(|| ident.to_string());
            let single_optional = option_inner(&f.ty);
            let double_optional = single_optional.as_ref().and_then(option_inner);
            FieldPlan {
                ident,
                ty: f.ty.clone(),
                key,
                single_optional,
                double_optional,
            }
        })
        .collect()
}

fn derive_product(name: &Ident, generics: &Generics, fields: &FieldsNamed) -> TokenStream2 {
    let plans = plan_fields(fields);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let target_name = name.to_string();

    let from_json_fields: Vec<TokenStream2> = plans
        .iter()
        .map(|p| {
            let ident = &p.ident;
            let key = &p.key;
            let ty = &p.ty;
            if let Some(inner) = &p.double_optional {
                quote! {
                    let #ident: #ty = match ::json_bind::names::resolve_field(entries, #key) {
                        None => None,
                        Some(__value) => {
                            if matches!(__value, ::json_bind::JsonValue::Null) {
                                Some(None)
                            } else {
                                Some(Some(::json_bind::path::with_field(path, #key, |p| {
                                    <#inner as ::json_bind::FromJson>::from_json(__value, p)
                                })?))
                            }
                        }
                    };
                }
            } else if p.single_optional.is_some() {
                quote! {
                    let #ident: #ty = match ::json_bind::names::resolve_field(entries, #key) {
                        None => None,
                        Some(__value) => ::json_bind::path::with_field(path, #key, |p| {
                            <#ty as ::json_bind::FromJson>::from_json(__value, p)
                        })?,
                    };
                }
            } else {
                quote! {
                    let #ident: #ty = match ::json_bind::names::resolve_field(entries, #key) {
                        Some(__value) => ::json_bind::path::with_field(path, #key, |p| {
                            <#ty as ::json_bind::FromJson>::from_json(__value, p)
                        })?,
                        None => <#ty as ::std::default::Default>::default(),
                    };
                }
            }
        })
        .collect();

    let field_idents: Vec<&Ident> = plans.iter().map(|p| &p.ident).collect();

    let to_json_fields: Vec<TokenStream2> = plans
        .iter()
        .map(|p| {
            let ident = &p.ident;
            let key = &p.key;
            if p.double_optional.is_some() {
                quote! {
                    match &self.#ident {
                        None => {}
                        Some(None) => {
                            __out.insert(#key.to_string(), ::json_bind::JsonValue::Null);
                        }
                        Some(Some(__inner)) => {
                            __out.insert(#key.to_string(), ::json_bind::ToJson::to_json(__inner, w)?);
                        }
                    }
                }
            } else if p.single_optional.is_some() {
                quote! {
                    if let Some(__inner) = &self.#ident {
                        __out.insert(#key.to_string(), ::json_bind::ToJson::to_json(__inner, w)?);
                    }
                }
            } else {
                quote! {
                    __out.insert(#key.to_string(), ::json_bind::ToJson::to_json(&self.#ident, w)?);
                }
            }
        })
        .collect();

    quote! {
        impl #impl_generics ::json_bind::FromJson for #name #ty_generics #where_clause {
            fn from_json(
                value: &::json_bind::JsonValue,
                path: &mut ::json_bind::path::JsonPath,
            ) -> ::json_bind::Result<Self> {
                let entries = match value {
                    ::json_bind::JsonValue::Object(entries) => entries,
                    other => {
                        return Err(::json_bind::Error::CannotBind {
                            value_kind: other.kind_name(),
                            target: #target_name,
                            path: path.clone(),
                        })
                    }
                };
                #(#from_json_fields)*
                Ok(Self { #(#field_idents),* })
            }
        }

        impl #impl_generics ::json_bind::ToJson for #name #ty_generics #where_clause {
            fn to_json(
                &self,
                w: &mut ::json_bind::Writer,
            ) -> ::json_bind::Result<::json_bind::JsonValue> {
                let mut __out = ::json_bind::indexmap::IndexMap::new();
                #(#to_json_fields)*
                Ok(::json_bind::JsonValue::Object(__out))
            }
        }
    }
}

fn derive_enum(name: &Ident, generics: &Generics, data: &DataEnum) -> TokenStream2 {
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return syn::Error::new_spanned(
                &variant.ident,
                "#[derive(Json)] only supports fieldless (unit) enum variants",
            )
            .to_compile_error();
        }
    }

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let target_name = name.to_string();

    let variant_idents: Vec<&Ident> = data.variants.iter().map(|v| &v.ident).collect();
    let variant_names: Vec<String> = data
        .variants
        .iter()
        .map(|v| field_rename(&v.attrs).unwrap_or_else(|| v.ident.to_string()))
        .collect();
    let ordinals: Vec<usize> = (0..data.variants.len()).collect();

    // Rule 4's "UNRECOGNIZED" fallback is only meaningful for enums that
    // declare such a variant (the protobuf-enum convention); plain Rust
    // enums simply don't match it and fall through to the ordinary
    // case-insensitive/ordinal rules.
    let unrecognized_arm = data
        .variants
        .iter()
        .find(|v| v.ident == "Unrecognized")
        .map(|v| {
            let ident = &v.ident;
            quote! {
                if __s == "UNRECOGNIZED" {
                    return Ok(Self::#ident);
                }
            }
        });

    quote! {
        impl #impl_generics ::json_bind::FromJson for #name #ty_generics #where_clause {
            fn from_json(
                value: &::json_bind::JsonValue,
                path: &mut ::json_bind::path::JsonPath,
            ) -> ::json_bind::Result<Self> {
                match value {
                    ::json_bind::JsonValue::Null => Err(::json_bind::Error::NullToPrimitive { path: path.clone() }),
                    ::json_bind::JsonValue::String(__s) => {
                        #(
                            if __s == #variant_names {
                                return Ok(Self::#variant_idents);
                            }
                        )*
                        #unrecognized_arm
                        #(
                            if __s.eq_ignore_ascii_case(#variant_names) {
                                return Ok(Self::#variant_idents);
                            }
                        )*
                        Err(::json_bind::Error::CannotBind {
                            value_kind: "string",
                            target: #target_name,
                            path: path.clone(),
                        })
                    }
                    ::json_bind::JsonValue::Number(_) => {
                        let ordinal: usize = <usize as ::json_bind::FromJson>::from_json(value, path)?;
                        match ordinal {
                            #(#ordinals => Ok(Self::#variant_idents),)*
                            _ => Err(::json_bind::Error::CannotBind {
                                value_kind: "number",
                                target: #target_name,
                                path: path.clone(),
                            }),
                        }
                    }
                    other => Err(::json_bind::Error::CannotBind {
                        value_kind: other.kind_name(),
                        target: #target_name,
                        path: path.clone(),
                    }),
                }
            }
        }

        impl #impl_generics ::json_bind::ToJson for #name #ty_generics #where_clause {
            fn to_json(&self, _w: &mut ::json_bind::Writer) -> ::json_bind::Result<::json_bind::JsonValue> {
                let name = match self {
                    #(Self::#variant_idents => #variant_names,)*
                };
                Ok(::json_bind::JsonValue::String(name.to_string()))
            }
        }
    }
}
