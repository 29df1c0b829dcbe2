//! Subscriber derive macro implementation, **parent-in-child** design.
//!
//! # Overview
//!
//! `#[derive(Subscriber)]` generates:
//!
//! 1. `impl Subscriber`: type key, type descriptor (parent link plus the
//!    method table from `DeclaresHandlers`) and the delegating `upcast`
//! 2. `impl Deref[Mut]`: generated when a parent field exists
//!
//! # Struct-level attributes `#[subscriber(...)]`
//!
//! | Key | Example | Description |
//! |-----|---------|-------------|
//! | `name` | `"app::screens::Settings"` | Overrides the fully-qualified type name |
//!
//! # Field-level attributes `#[subscriber(...)]`
//!
//! | Key | Description |
//! |-----|-------------|
//! | `parent` | Marks this field as the parent subscriber (type is auto-detected) |
//!
//! The method table comes from `DeclaresHandlers`, which `#[handlers]`
//! implements. A type without handlers of its own still needs the empty
//! impl: `impl DeclaresHandlers for Base {}`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, Member, Type, spanned::Spanned};

// ============================================================================
// Attribute structures
// ============================================================================

/// Struct-level `#[subscriber(…)]` options.
#[derive(Default)]
struct StructAttrs {
    name: Option<syn::LitStr>,
}

/// The field marked `#[subscriber(parent)]`.
struct ParentField {
    member: Member,
    ty: Type,
}

// ============================================================================
// Entry point
// ============================================================================

pub fn derive_subscriber(input: &DeriveInput) -> syn::Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "Subscriber cannot be derived for generic types",
        ));
    }

    let attrs = parse_struct_attrs(&input.attrs)?;

    match &input.data {
        Data::Struct(data) => {
            let parent = find_parent_field(&data.fields)?;
            Ok(generate_impl(&input.ident, &attrs, parent.as_ref()))
        }
        Data::Enum(_) => Err(syn::Error::new(
            input.span(),
            "Subscriber does not support enums. Use structs with a parent field instead.",
        )),
        Data::Union(_) => Err(syn::Error::new(
            input.span(),
            "Subscriber cannot be derived for unions",
        )),
    }
}

// ============================================================================
// Attribute parsing
// ============================================================================

fn parse_struct_attrs(attrs: &[Attribute]) -> syn::Result<StructAttrs> {
    let mut result = StructAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("subscriber") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                result.name = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unknown subscriber option, expected `name`"))
            }
        })?;
    }

    Ok(result)
}

fn is_parent_field(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut is_parent = false;

    for attr in attrs {
        if !attr.path().is_ident("subscriber") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("parent") {
                is_parent = true;
                Ok(())
            } else {
                Err(meta.error("unknown subscriber field option, expected `parent`"))
            }
        })?;
    }

    Ok(is_parent)
}

fn find_parent_field(fields: &Fields) -> syn::Result<Option<ParentField>> {
    let mut parent: Option<ParentField> = None;

    for (index, field) in fields.iter().enumerate() {
        if !is_parent_field(&field.attrs)? {
            continue;
        }
        if parent.is_some() {
            return Err(syn::Error::new(
                field.span(),
                "only one field can be marked #[subscriber(parent)]",
            ));
        }

        let member = match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(index.into()),
        };
        parent = Some(ParentField {
            member,
            ty: field.ty.clone(),
        });
    }

    Ok(parent)
}

// ============================================================================
// Code generation
// ============================================================================

fn generate_impl(name: &Ident, attrs: &StructAttrs, parent: Option<&ParentField>) -> TokenStream {
    // ── type_key ──
    let type_key_impl = match &attrs.name {
        Some(lit) => quote! {
            fn type_key() -> ::herald_core::TypeKey {
                ::herald_core::TypeKey::named::<Self>(#lit)
            }
        },
        None => quote! {},
    };

    // ── describe ──
    let parent_link = match parent {
        Some(ParentField { ty, .. }) => quote! { .parent_of::<#ty>() },
        None => quote! {},
    };

    // ── upcast: self first, then delegate to parent ──
    let upcast_fallback = match parent {
        Some(ParentField { member, ty }) => quote! {
            <#ty as ::herald_core::Subscriber>::upcast(&self.#member, target)
        },
        None => quote! { ::std::option::Option::None },
    };

    let subscriber_impl = quote! {
        impl ::herald_core::Subscriber for #name {
            #type_key_impl

            fn describe() -> ::herald_core::TypeDescriptor {
                ::herald_core::TypeDescriptor::builder(
                    <Self as ::herald_core::Subscriber>::type_key(),
                )
                #parent_link
                .declared(<Self as ::herald_core::DeclaresHandlers>::declared_methods())
                .build()
            }

            fn upcast(
                &self,
                target: ::std::any::TypeId,
            ) -> ::std::option::Option<&dyn ::std::any::Any> {
                if target == ::std::any::TypeId::of::<Self>() {
                    return ::std::option::Option::Some(self as &dyn ::std::any::Any);
                }
                #upcast_fallback
            }
        }
    };

    // ── Deref / DerefMut ──
    let deref_impls = match parent {
        Some(ParentField { member, ty }) => quote! {
            impl ::std::ops::Deref for #name {
                type Target = #ty;
                #[inline]
                fn deref(&self) -> &Self::Target {
                    &self.#member
                }
            }

            impl ::std::ops::DerefMut for #name {
                #[inline]
                fn deref_mut(&mut self) -> &mut Self::Target {
                    &mut self.#member
                }
            }
        },
        None => quote! {},
    };

    quote! {
        #subscriber_impl
        #deref_impls
    }
}
