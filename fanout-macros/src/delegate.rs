//! The `#[delegate]` attribute.
//!
//! Turns a delegate trait into a fanout contract:
//!
//! - adds `Send + Sync` supertraits when missing
//! - adds a `responds_to` method (default: every method) unless declared
//! - emits a `<Trait>Methods` table of `MethodId` constants
//! - implements `Contract` for `dyn Trait`
//! - implements the trait for `DispatchProxy<dyn Trait>`

use proc_macro::TokenStream;
use proc_macro2::{Literal, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{
    FnArg, GenericArgument, GenericParam, Ident, ItemTrait, LitStr, PathArguments, ReturnType,
    Signature, Token, TraitItem, Type, TypeParamBound,
    parse::{Parse, ParseStream},
    parse_macro_input, parse_quote,
};

const RESPONDS_TO: &str = "responds_to";
const MAX_METHODS: usize = 64;

/// Arguments for the `#[delegate]` macro.
pub(crate) struct DelegateArgs {
    name: Option<LitStr>,
}

impl Parse for DelegateArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut name = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "name" => {
                    name = Some(input.parse::<LitStr>()?);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(DelegateArgs { name })
    }
}

/// How the proxy forwards one method, decided by its return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Forwarding {
    Notify,
    NotifyFallible,
    Query,
    QueryFallible,
}

impl Forwarding {
    fn classify(output: &ReturnType) -> syn::Result<Self> {
        let ty = match output {
            ReturnType::Default => return Ok(Forwarding::Notify),
            ReturnType::Type(_, ty) => ty.as_ref(),
        };
        if is_unit(ty) {
            return Ok(Forwarding::Notify);
        }
        if let Some((name, inner)) = last_segment(ty) {
            if name == "Option" {
                return Ok(Forwarding::Query);
            }
            if name == "Result" {
                match inner {
                    Some(ok) if is_unit(ok) => return Ok(Forwarding::NotifyFallible),
                    Some(ok) if last_segment(ok).is_some_and(|(n, _)| n == "Option") => {
                        return Ok(Forwarding::QueryFallible);
                    }
                    _ => {}
                }
            }
        }
        Err(syn::Error::new_spanned(
            ty,
            "delegate methods must return `()`, `Result<(), E>`, `Option<T>` or `Result<Option<T>, E>`",
        ))
    }
}

fn is_unit(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(tuple) if tuple.elems.is_empty())
}

/// Name of the last path segment and its first type argument.
fn last_segment(ty: &Type) -> Option<(String, Option<&Type>)> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    let first = match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    };
    Some((segment.ident.to_string(), first))
}

fn has_supertrait(item: &ItemTrait, name: &str) -> bool {
    item.supertraits.iter().any(|bound| {
        matches!(bound, TypeParamBound::Trait(t) if t.path.segments.last().is_some_and(|s| s.ident == name))
    })
}

/// One forwardable method of the contract.
struct Method {
    constant: Ident,
    name: LitStr,
    index: Literal,
    forwarding: Forwarding,
    signature: Signature,
    args: Vec<Ident>,
}

impl Method {
    fn parse(sig: &Signature, index: usize) -> syn::Result<Self> {
        if let Some(asyncness) = &sig.asyncness {
            return Err(syn::Error::new_spanned(
                asyncness,
                "delegate methods cannot be async; dispatch is synchronous",
            ));
        }
        if let Some(param) = sig
            .generics
            .params
            .iter()
            .find(|p| !matches!(p, GenericParam::Lifetime(_)))
        {
            return Err(syn::Error::new_spanned(
                param,
                "delegate methods cannot have type or const parameters",
            ));
        }
        match sig.inputs.first() {
            Some(FnArg::Receiver(receiver))
                if receiver.reference.is_some() && receiver.mutability.is_none() => {}
            _ => {
                return Err(syn::Error::new_spanned(
                    sig,
                    "delegate methods must take `&self`",
                ));
            }
        }

        let forwarding = Forwarding::classify(&sig.output)?;

        let mut signature = sig.clone();
        let mut args = Vec::new();
        for (i, input) in signature.inputs.iter_mut().skip(1).enumerate() {
            if let FnArg::Typed(pat_type) = input {
                let arg = format_ident!("__arg{}", i);
                pat_type.pat = Box::new(parse_quote!(#arg));
                args.push(arg);
            }
        }

        let ident = sig.ident.to_string();
        let bare = ident.trim_start_matches("r#");
        Ok(Method {
            constant: format_ident!("{}", bare.to_uppercase()),
            name: LitStr::new(bare, sig.ident.span()),
            index: Literal::u8_unsuffixed(index as u8),
            forwarding,
            signature,
            args,
        })
    }

    fn forwarder(&self, table: &Ident) -> TokenStream2 {
        let Method {
            constant,
            signature,
            args,
            ..
        } = self;
        let method = &signature.ident;
        let call = quote! {
            __listener.#method(#(::core::clone::Clone::clone(&#args)),*)
        };
        let body = match self.forwarding {
            Forwarding::Notify => quote! {
                self.notify(#table::#constant, |__listener| {
                    #call;
                });
            },
            Forwarding::NotifyFallible => quote! {
                self.notify_fallible(#table::#constant, |__listener| #call)
            },
            Forwarding::Query => quote! {
                self.query(#table::#constant, |__listener| #call)
            },
            Forwarding::QueryFallible => quote! {
                self.query_fallible(#table::#constant, |__listener| #call)
            },
        };
        quote! {
            #signature {
                #body
            }
        }
    }
}

/// Implementation of the `#[delegate]` macro.
pub(crate) fn delegate_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as DelegateArgs);
    let input = parse_macro_input!(item as ItemTrait);

    match expand(args, input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(args: DelegateArgs, mut item: ItemTrait) -> syn::Result<TokenStream2> {
    if !item.generics.params.is_empty() || item.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "delegate traits cannot be generic",
        ));
    }

    let mut methods = Vec::new();
    let mut declares_responds_to = false;
    for trait_item in &item.items {
        match trait_item {
            TraitItem::Fn(f) if f.sig.ident == RESPONDS_TO => declares_responds_to = true,
            TraitItem::Fn(f) => methods.push(Method::parse(&f.sig, methods.len())?),
            TraitItem::Const(c) => {
                return Err(syn::Error::new_spanned(
                    c,
                    "delegate traits cannot declare associated constants",
                ));
            }
            TraitItem::Type(t) => {
                return Err(syn::Error::new_spanned(
                    t,
                    "delegate traits cannot declare associated types",
                ));
            }
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "unsupported item in delegate trait",
                ));
            }
        }
    }
    if methods.len() > MAX_METHODS {
        return Err(syn::Error::new_spanned(
            &item.ident,
            format!("a delegate contract supports at most {} methods", MAX_METHODS),
        ));
    }

    for bound in ["Send", "Sync"] {
        if !has_supertrait(&item, bound) {
            let path = format_ident!("{}", bound);
            item.colon_token.get_or_insert_with(Default::default);
            item.supertraits.push(parse_quote!(::core::marker::#path));
        }
    }
    if !declares_responds_to {
        item.items.push(parse_quote! {
            /// Methods this listener answers. Read once, when the listener is registered.
            fn responds_to(&self) -> ::fanout::MethodSet {
                ::fanout::MethodSet::all()
            }
        });
    }

    let trait_ident = &item.ident;
    let vis = &item.vis;
    let table = format_ident!("{}Methods", trait_ident);
    let contract_name = args
        .name
        .unwrap_or_else(|| LitStr::new(&trait_ident.to_string(), trait_ident.span()));

    let constants = methods.iter().map(|m| {
        let Method {
            constant,
            name,
            index,
            ..
        } = m;
        quote! {
            #[doc = concat!("`", #name, "`")]
            pub const #constant: ::fanout::MethodId = ::fanout::MethodId::new(#index, #name);
        }
    });
    let names = methods.iter().map(|m| &m.name);
    let forwarders = methods.iter().map(|m| m.forwarder(&table));

    Ok(quote! {
        #item

        #[doc = concat!("Method identifiers of the `", stringify!(#trait_ident), "` delegate contract.")]
        #[derive(Clone, Copy, Debug, Default)]
        #vis struct #table;

        impl #table {
            #(#constants)*
        }

        impl ::fanout::Contract for dyn #trait_ident {
            const NAME: &'static str = #contract_name;
            const METHODS: &'static [&'static str] = &[#(#names),*];

            fn capabilities(&self) -> ::fanout::MethodSet {
                <Self as #trait_ident>::responds_to(self)
            }
        }

        impl #trait_ident for ::fanout::DispatchProxy<dyn #trait_ident> {
            #(#forwarders)*

            fn responds_to(&self) -> ::fanout::MethodSet {
                ::fanout::MethodSet::all()
            }
        }
    })
}
