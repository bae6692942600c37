//! Procedural macros for rulegate
//!
//! This crate provides procedural macros for the rulegate access-control library:
//! - `#[rule]`: Attribute macro turning a check function into a leaf rule constructor
//!
//! These macros are re-exported by the main `rulegate` crate and should
//! typically be used through that interface.
//!
//! # Examples
//!
//! ## Basic usage
//!
//! ```ignore
//! use rulegate::prelude::*;
//!
//! #[rule(effect = u16, deny = 401)]
//! fn logged_in(user_id: Option<u64>) -> bool {
//!     user_id.is_some()
//! }
//!
//! let rule: Rule<u16> = logged_in(None);
//! ```
//!
//! ## Base rules
//!
//! ```ignore
//! use rulegate::prelude::*;
//!
//! #[rule(effect = u16, base = logged_in(user_id), deny = 403)]
//! fn topic_owner(user_id: Option<u64>, owner: u64) -> bool {
//!     user_id == Some(owner)
//! }
//! ```
//!
//! ## Fallible checks
//!
//! ```ignore
//! use rulegate::prelude::*;
//!
//! #[rule(name = "member", effect = u16, deny = 403)]
//! fn is_member(raw_role: String) -> Result<bool, std::num::ParseIntError> {
//!     Ok(raw_role.parse::<u8>()? >= 2)
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
    Expr, FnArg, Ident, ItemFn, LitStr, Pat, PatType, ReturnType, Token, Type,
};

/// A single `key = value` argument of `#[rule(...)]`
enum RuleArg {
    Name(LitStr),
    Effect(Type),
    Base(Expr),
    Deny(Expr),
}

impl Parse for RuleArg {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let key: Ident = input.parse()?;
        input.parse::<Token![=]>()?;

        match key.to_string().as_str() {
            "name" => Ok(RuleArg::Name(input.parse()?)),
            "effect" => Ok(RuleArg::Effect(input.parse()?)),
            "base" => Ok(RuleArg::Base(input.parse()?)),
            "deny" => Ok(RuleArg::Deny(input.parse()?)),
            other => Err(syn::Error::new_spanned(
                &key,
                format!("Unknown attribute '{}', expected one of: name, effect, base, deny", other),
            )),
        }
    }
}

/// Arguments parsed from the `#[rule(...)]` attribute
#[derive(Default)]
struct RuleArgs {
    name: Option<String>,
    effect: Option<Type>,
    base: Option<Expr>,
    deny: Option<Expr>,
}

impl Parse for RuleArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = RuleArgs::default();

        for arg in Punctuated::<RuleArg, Token![,]>::parse_terminated(input)? {
            match arg {
                RuleArg::Name(lit) => args.name = Some(lit.value()),
                RuleArg::Effect(ty) => args.effect = Some(ty),
                RuleArg::Base(expr) => args.base = Some(expr),
                RuleArg::Deny(expr) => args.deny = Some(expr),
            }
        }

        Ok(args)
    }
}

/// Collect parameter names, rejecting receivers and destructuring patterns
fn param_names(func: &ItemFn) -> syn::Result<Vec<Ident>> {
    func.sig
        .inputs
        .iter()
        .map(|input| match input {
            FnArg::Typed(PatType { pat, .. }) => match &**pat {
                Pat::Ident(pat_ident) => Ok(pat_ident.ident.clone()),
                _ => Err(syn::Error::new_spanned(
                    pat,
                    "Only simple parameter names are supported",
                )),
            },
            FnArg::Receiver(_) => Err(syn::Error::new_spanned(
                input,
                "Self parameter not supported in #[rule]",
            )),
        })
        .collect()
}

/// Check if a type is exactly `bool`
fn is_bool(ty: &Type) -> bool {
    matches!(ty, Type::Path(type_path) if type_path.qself.is_none() && type_path.path.is_ident("bool"))
}

/// Check if a type is Result<T, E>
fn is_result_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Result";
        }
    }
    false
}

/// Validate the function signature, returning the declared check type
fn validate_function(func: &ItemFn) -> syn::Result<&Type> {
    if let Some(asyncness) = func.sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "#[rule] checks must be synchronous",
        ));
    }

    if !func.sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &func.sig.generics,
            "#[rule] does not support generic functions",
        ));
    }

    match &func.sig.output {
        ReturnType::Type(_, ty) if is_bool(ty) || is_result_type(ty) => Ok(&**ty),
        ReturnType::Type(_, ty) => Err(syn::Error::new_spanned(
            ty,
            "#[rule] requires return type bool or Result<bool, E>",
        )),
        ReturnType::Default => Err(syn::Error::new_spanned(
            &func.sig,
            "#[rule] requires return type bool or Result<bool, E>",
        )),
    }
}

/// Rebind every parameter to a clone so a `move` closure can own it
fn clone_params(params: &[Ident]) -> TokenStream2 {
    quote! {
        #(
            #[allow(unused_variables)]
            let #params = ::core::clone::Clone::clone(&#params);
        )*
    }
}

/// Attribute macro for defining leaf rules
///
/// This macro turns a function returning the rule's verdict into a function with
/// the same parameters returning a `rulegate::Rule`. The parameters are captured
/// by the rule, so the generated constructor is where per-request values
/// (session handles, resource ids) enter the rule tree.
///
/// # Arguments
///
/// * `name` - Optional rule name (defaults to the function name)
/// * `effect` - Denial effect type (defaults to `()`)
/// * `base` - Optional expression building the base rule; may use the parameters
/// * `deny` - Optional expression producing the denial effect; may use the parameters
///
/// # Requirements
///
/// * Function must be synchronous and non-generic
/// * Return type must be `bool` or `Result<bool, E>` with `E` convertible into
///   `rulegate::BoxError`
/// * Parameters must be `Clone + Send + Sync + 'static`
///
/// # Example
///
/// ```ignore
/// use rulegate::prelude::*;
///
/// #[rule(effect = &'static str, deny = "redirect:/login")]
/// fn logged_in(user_id: Option<u64>) -> bool {
///     user_id.is_some()
/// }
///
/// let rule = logged_in(Some(7));
/// assert_eq!(rule.as_leaf().unwrap().name(), "logged_in");
/// ```
#[proc_macro_attribute]
pub fn rule(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as RuleArgs);
    let input_fn = parse_macro_input!(item as ItemFn);

    match expand_rule(args, input_fn) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Core expansion logic for the rule macro
fn expand_rule(args: RuleArgs, input_fn: ItemFn) -> syn::Result<TokenStream2> {
    let check_ty = validate_function(&input_fn)?;
    let params = param_names(&input_fn)?;

    let attrs = &input_fn.attrs;
    let vis = &input_fn.vis;
    let fn_name = &input_fn.sig.ident;
    let inputs = &input_fn.sig.inputs;
    let block = &input_fn.block;

    let rule_name = args.name.unwrap_or_else(|| fn_name.to_string());
    let effect = args
        .effect
        .map(|ty| quote! { #ty })
        .unwrap_or_else(|| quote! { () });

    let check_method = if is_bool(check_ty) {
        quote! { check }
    } else {
        quote! { try_check }
    };

    let rebind = clone_params(&params);

    let base = args.base.map(|base| {
        quote! {
            let __builder = {
                #rebind
                __builder.base(#base)
            };
        }
    });

    let deny = args.deny.map(|deny| {
        quote! {
            let __builder = {
                #rebind
                __builder.on_denied(move || -> #effect { #deny })
            };
        }
    });

    Ok(quote! {
        #(#attrs)*
        #vis fn #fn_name(#inputs) -> ::rulegate::Rule<#effect> {
            let __builder = ::rulegate::Rule::<#effect>::builder(#rule_name);
            #base
            let __builder = {
                #rebind
                __builder.#check_method(move || -> #check_ty #block)
            };
            #deny
            __builder.build()
        }
    })
}
