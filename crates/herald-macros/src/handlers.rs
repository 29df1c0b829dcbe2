//! `#[handlers]` attribute macro implementation.
//!
//! Turns the `#[subscribe(...)]` methods of an inherent impl block into the
//! method table returned by `DeclaresHandlers::declared_methods`.
//!
//! # Method-level attributes `#[subscribe(...)]`
//!
//! | Key | Example | Default | Description |
//! |-----|---------|---------|-------------|
//! | `mode` | `"background"` | `"posting"` | Thread mode |
//! | `priority` | `10` | `0` | Delivery priority, higher first |
//! | `sticky` | `sticky` / `sticky = true` | `false` | Replay the latest sticky message |
//!
//! Handlers return `()` or `Result<(), E>` with `E: Display`; an `Err`
//! surfaces from `HandlerMethod::invoke` as `InvokeError::HandlerFailed`.
//!
//! Methods are recorded as written (visibility, receiver, parameters), so
//! malformed handlers are rejected when the type is resolved. With
//! `#[handlers(index)]` they are rejected at compile time instead, and the
//! type is added to the generated index.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::{
    Attribute, Expr, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, LitBool, LitStr, Meta, Token,
    Type, ext::IdentExt, parse_macro_input, spanned::Spanned,
};

const THREAD_MODES: &str = "posting, main, main_ordered, background, async";

/// Options of `#[handlers(...)]`.
#[derive(Default)]
struct HandlersOptions {
    index: bool,
}

/// Parsed `#[subscribe(...)]`.
struct SubscribeArgs {
    mode: proc_macro2::TokenStream,
    priority: Option<Expr>,
    sticky: bool,
}

impl Default for SubscribeArgs {
    fn default() -> Self {
        Self {
            mode: quote!(::herald_core::ThreadMode::Posting),
            priority: None,
            sticky: false,
        }
    }
}

/// Receiver shape of a method.
enum Receiver {
    /// `&self`
    Shared,
    /// `&mut self`
    Exclusive,
    /// `self`, `self: Box<Self>` and friends
    Other,
    /// No receiver at all
    Static,
}

/// Implementation of `#[handlers]` / `#[handlers(index)]`.
///
/// Leaves the impl block in place minus the `#[subscribe]` attributes, and
/// appends the `DeclaresHandlers` impl. In index mode, also appends a
/// `#[::herald_core::linkme::distributed_slice]` static that wires the type
/// into `GENERATED_INDEX`.
pub fn handlers(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut options = HandlersOptions::default();
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("index") {
            options.index = true;
            Ok(())
        } else {
            Err(meta.error("unknown handlers option, expected `index`"))
        }
    });
    parse_macro_input!(attr with parser);

    let block = parse_macro_input!(item as ItemImpl);

    match expand(block, &options) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(mut block: ItemImpl, options: &HandlersOptions) -> syn::Result<proc_macro2::TokenStream> {
    if let Some((_, path, _)) = &block.trait_ {
        return Err(syn::Error::new(
            path.span(),
            "#[handlers] must be placed on an inherent impl block",
        ));
    }
    if !block.generics.params.is_empty() {
        return Err(syn::Error::new(
            block.generics.span(),
            "#[handlers] does not support generic impl blocks",
        ));
    }

    let self_ty = (*block.self_ty).clone();
    let mut descriptors = Vec::new();

    for item in &mut block.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let Some(args) = take_subscribe_attr(&mut method.attrs)? else {
            continue;
        };
        descriptors.push(method_descriptor(&self_ty, method, &args, options.index)?);
    }

    let index_entry = if options.index {
        index_entry(&self_ty)?
    } else {
        quote! {}
    };

    Ok(quote! {
        #block

        impl ::herald_core::DeclaresHandlers for #self_ty {
            fn declared_methods() -> ::std::vec::Vec<::herald_core::MethodDescriptor> {
                ::std::vec![#(#descriptors),*]
            }
        }

        #index_entry
    })
}

// ============================================================================
// Attribute parsing
// ============================================================================

/// Removes the `#[subscribe]` attribute from `attrs` and parses it.
fn take_subscribe_attr(attrs: &mut Vec<Attribute>) -> syn::Result<Option<SubscribeArgs>> {
    let mut found: Option<Attribute> = None;
    let mut error: Option<syn::Error> = None;

    attrs.retain(|attr| {
        if !attr.path().is_ident("subscribe") {
            return true;
        }
        if found.is_some() {
            error.get_or_insert_with(|| {
                syn::Error::new(attr.span(), "duplicate #[subscribe] attribute")
            });
        } else {
            found = Some(attr.clone());
        }
        false
    });

    if let Some(error) = error {
        return Err(error);
    }
    found.map(|attr| parse_subscribe_args(&attr)).transpose()
}

fn parse_subscribe_args(attr: &Attribute) -> syn::Result<SubscribeArgs> {
    let mut args = SubscribeArgs::default();

    // Bare `#[subscribe]` takes every default.
    if matches!(attr.meta, Meta::Path(_)) {
        return Ok(args);
    }

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("mode") {
            let lit: LitStr = meta.value()?.parse()?;
            args.mode = thread_mode(&lit)?;
        } else if meta.path.is_ident("priority") {
            args.priority = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("sticky") {
            args.sticky = if meta.input.peek(Token![=]) {
                meta.value()?.parse::<LitBool>()?.value
            } else {
                true
            };
        } else {
            return Err(meta.error(
                "unknown subscribe option, expected `mode`, `priority` or `sticky`",
            ));
        }
        Ok(())
    })?;

    Ok(args)
}

fn thread_mode(lit: &LitStr) -> syn::Result<proc_macro2::TokenStream> {
    let variant = match lit.value().as_str() {
        "posting" => quote!(Posting),
        "main" => quote!(Main),
        "main_ordered" => quote!(MainOrdered),
        "background" => quote!(Background),
        "async" => quote!(Async),
        other => {
            return Err(syn::Error::new(
                lit.span(),
                format!("unknown thread mode `{other}`, expected one of: {THREAD_MODES}"),
            ));
        }
    };
    Ok(quote!(::herald_core::ThreadMode::#variant))
}

// ============================================================================
// Code generation
// ============================================================================

fn receiver_of(method: &ImplItemFn) -> Receiver {
    match method.sig.receiver() {
        None => Receiver::Static,
        Some(receiver) => match (&receiver.reference, &receiver.mutability) {
            (Some(_), None) => Receiver::Shared,
            (Some(_), Some(_)) => Receiver::Exclusive,
            (None, _) => Receiver::Other,
        },
    }
}

/// Type recorded for a parameter: the referent of `&M`, else the type itself.
fn message_type(ty: &Type) -> &Type {
    match ty {
        Type::Reference(reference) => &reference.elem,
        other => other,
    }
}

fn method_descriptor(
    self_ty: &Type,
    method: &ImplItemFn,
    args: &SubscribeArgs,
    strict: bool,
) -> syn::Result<proc_macro2::TokenStream> {
    let sig = &method.sig;
    let receiver = receiver_of(method);

    if matches!(receiver, Receiver::Exclusive) {
        return Err(syn::Error::new(
            sig.inputs.span(),
            "handler methods take `&self`; `&mut self` cannot be called through a shared subscriber",
        ));
    }
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new(
            asyncness.span(),
            "handler methods must be synchronous",
        ));
    }

    let params: Vec<&Type> = sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(typed) => Some(&*typed.ty),
            FnArg::Receiver(_) => None,
        })
        .collect();

    let is_public = matches!(method.vis, syn::Visibility::Public(_));

    // `pub fn(&self, &M)`: the only shape that can be called.
    let message = match (&receiver, params.as_slice()) {
        (Receiver::Shared, [Type::Reference(reference)]) if reference.mutability.is_none() => {
            Some(&*reference.elem)
        }
        _ => None,
    };

    if strict && (!is_public || message.is_none()) {
        return Err(syn::Error::new(
            sig.span(),
            "indexed handler methods must have the shape `pub fn(&self, &Message)`",
        ));
    }

    let name = LitStr::new(&sig.ident.unraw().to_string(), sig.ident.span());
    let ident = &sig.ident;
    let param_types = params.iter().map(|ty| message_type(ty));

    let visibility = if is_public {
        quote!(::herald_core::Visibility::Public)
    } else {
        quote!(::herald_core::Visibility::Restricted)
    };

    let flags = match receiver {
        Receiver::Static => quote! { .flags(::herald_core::MethodFlags::STATIC) },
        _ => quote! {},
    };

    let mode = &args.mode;
    let sticky = args.sticky;
    let priority = match &args.priority {
        Some(priority) => quote! { .priority(#priority) },
        None => quote! {},
    };

    let invoker = match message {
        Some(message) => quote! {
            .invoker(|receiver: &dyn ::std::any::Any, message: &dyn ::std::any::Any| -> ::herald_core::InvokeResult {
                let receiver = receiver.downcast_ref::<#self_ty>().ok_or(
                    ::herald_core::InvokeError::ReceiverMismatch {
                        expected: ::std::any::type_name::<#self_ty>(),
                    },
                )?;
                let message = message.downcast_ref::<#message>().ok_or(
                    ::herald_core::InvokeError::MessageMismatch {
                        expected: ::std::any::type_name::<#message>(),
                    },
                )?;
                ::herald_core::HandlerOutput::into_invoke_result(<#self_ty>::#ident(receiver, message))
            })
        },
        None => quote! {},
    };

    Ok(quote! {
        ::herald_core::MethodDescriptor::new(#name, ::herald_core::TypeKey::of::<#self_ty>())
            #(.param(::herald_core::TypeKey::of::<#param_types>()))*
            .visibility(#visibility)
            #flags
            .marker(
                ::herald_core::HandlerMarker::new()
                    .thread_mode(#mode)
                    #priority
                    .sticky(#sticky)
            )
            #invoker
    })
}

/// Builds the generated index entry for `self_ty`.
fn index_entry(self_ty: &Type) -> syn::Result<proc_macro2::TokenStream> {
    let type_ident = match self_ty {
        Type::Path(path) => path.path.segments.last().map(|segment| &segment.ident),
        _ => None,
    }
    .ok_or_else(|| {
        syn::Error::new(
            self_ty.span(),
            "#[handlers(index)] requires a named subscriber type",
        )
    })?;

    let static_name = index_static_name(type_ident);

    Ok(quote! {
        #[::herald_core::linkme::distributed_slice(::herald_core::GENERATED_INDEX)]
        #[linkme(crate = ::herald_core::linkme)]
        static #static_name: ::herald_core::IndexEntry = ::herald_core::IndexEntry::new(|| {
            ::herald_core::SimpleSubscriberInfo::from_declared(
                <#self_ty as ::herald_core::Subscriber>::type_key(),
                <#self_ty as ::herald_core::DeclaresHandlers>::declared_methods(),
            )
        });
    })
}

fn index_static_name(type_ident: &Ident) -> Ident {
    let upper = type_ident.unraw().to_string().to_uppercase();
    format_ident!("_HERALD_INDEX_{}", upper, span = Span::call_site())
}
