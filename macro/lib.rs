use darling::ast::NestedMeta;
use darling::util::PathList;
use darling::FromMeta;
use derive_syn_parse::Parse;
use proc_macro::TokenStream as TokenStream1;
use proc_macro2::Span;
use proc_macro2::TokenStream;
use proc_macro_error::{abort, proc_macro_error};
use std::collections::HashSet;
use syn::spanned::Spanned;
use syn::*;
use template_quote::quote;

mod descriptor;
mod dispatch;
mod resolve;
mod store;
mod synth;
mod unify;

use descriptor::Descriptors;
use synth::{Registry, WrapperDef};

/// Pulls every `#[superstruct(..)]` attribute out of `attrs` and parses their arguments as one
/// list. Returns `None` if there was no such attribute.
pub(crate) fn take_superstruct_attrs<T: FromMeta + Default>(
    attrs: &mut Vec<Attribute>,
) -> Option<T> {
    let mut found = false;
    let mut nested = Vec::new();
    let mut span = Span::call_site();
    attrs.retain(|attr| {
        if !attr.path().is_ident("superstruct") {
            return true;
        }
        found = true;
        span = attr.span();
        match &attr.meta {
            Meta::Path(_) => (),
            Meta::List(list) => nested.extend(
                NestedMeta::parse_meta_list(list.tokens.clone())
                    .unwrap_or_else(|e| abort!(e.span(), &format!("{}", &e))),
            ),
            Meta::NameValue(nv) => abort!(nv.span(), "Expected `#[superstruct(..)]`"),
        }
        false
    });
    if !found {
        None
    } else if nested.is_empty() {
        Some(T::default())
    } else {
        Some(T::from_list(&nested).unwrap_or_else(|e| abort!(span, &format!("{}", &e))))
    }
}

/// `self::A` written as `A`; other types are returned unchanged.
pub(crate) fn local_type(ty: &Type) -> Type {
    match ty {
        Type::Path(TypePath { qself: None, path })
            if path.leading_colon.is_none()
                && path.segments.len() > 1
                && path.segments[0].ident == "self" =>
        {
            Type::Path(TypePath {
                qself: None,
                path: Path {
                    leading_colon: None,
                    segments: path.segments.iter().skip(1).cloned().collect(),
                },
            })
        }
        Type::Paren(p) => local_type(&p.elem),
        _ => ty.clone(),
    }
}

pub(crate) fn type_key(ty: &Type) -> String {
    let ty = local_type(ty);
    quote!(#ty).to_string()
}

pub(crate) fn path_of_ident(ident: Ident) -> Path {
    Path {
        leading_colon: None,
        segments: std::iter::once(PathSegment {
            ident,
            arguments: PathArguments::None,
        })
        .collect(),
    }
}

/// `snake_case` to `CamelCase`.
pub(crate) fn camel(name: &str) -> String {
    let mut out = String::new();
    let mut upper = true;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Parse)]
struct Arguments {
    _crate_token: Option<Token![crate]>,
    #[parse_if(_crate_token.is_some())]
    _eq_token: Option<Token![=]>,
    #[parse_if(_crate_token.is_some())]
    krate: Option<Path>,
}

#[derive(FromMeta, Default)]
#[darling(default)]
struct WrapperArgs {
    nested_derive: PathList,
}

fn wrapper_of_enum(item_enum: ItemEnum, args: WrapperArgs) -> WrapperDef {
    if !item_enum.generics.params.is_empty() || item_enum.generics.where_clause.is_some() {
        abort!(
            item_enum.generics.span(),
            "Generic wrappers are not supported"
        )
    }
    if item_enum.variants.is_empty() {
        abort!(item_enum.span(), "A wrapper requires at least one subtype")
    }
    let variants = item_enum
        .variants
        .iter()
        .map(|variant| {
            if let Some((_, expr)) = &variant.discriminant {
                abort!(expr.span(), "Discriminants are not supported")
            }
            if let Some(attr) = variant.attrs.first() {
                abort!(attr.span(), "Attributes on subtypes are not supported")
            }
            match &variant.fields {
                Fields::Unit => (
                    variant.ident.clone(),
                    Type::Path(TypePath {
                        qself: None,
                        path: path_of_ident(variant.ident.clone()),
                    }),
                ),
                Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                    (variant.ident.clone(), local_type(&fields.unnamed[0].ty))
                }
                o => abort!(
                    o.span(),
                    "Expected a subtype name `Square` or a named subtype `Round(Circle)`"
                ),
            }
        })
        .collect::<Vec<_>>();
    WrapperDef {
        ident: item_enum.ident,
        vis: item_enum.vis,
        attrs: item_enum.attrs,
        variants,
        nested_derive: args.nested_derive.to_vec(),
        owner: None,
    }
}

fn expand_module(args: &Arguments, mut item_mod: ItemMod) -> TokenStream {
    let krate = args
        .krate
        .clone()
        .unwrap_or_else(|| parse_quote!(::superstruct));
    let mod_span = item_mod.span();
    let Some((_, items)) = &mut item_mod.content else {
        abort!(mod_span, "`#[superstruct]` requires an inline module")
    };
    let mut wrappers = Vec::new();
    let mut kept = Vec::new();
    for item in items.drain(..) {
        match item {
            Item::Enum(mut item_enum) => {
                if let Some(args) = take_superstruct_attrs::<WrapperArgs>(&mut item_enum.attrs) {
                    wrappers.push(wrapper_of_enum(item_enum, args));
                } else {
                    kept.push(Item::Enum(item_enum));
                }
            }
            o => kept.push(o),
        }
    }
    if wrappers.is_empty() {
        abort!(
            mod_span,
            "Cannot find any `#[superstruct] enum` in the module";
            help = "declare the wrapper as a `#[superstruct]` enum listing the subtypes"
        );
    }
    let descriptors = Descriptors::collect(&mut kept);
    for (_, ty) in wrappers.iter().flat_map(|wrapper| &wrapper.variants) {
        let Type::Path(TypePath { qself: None, path }) = ty else {
            continue;
        };
        match path.segments.last() {
            Some(last) if path.segments.len() > 1 || path.leading_colon.is_some() => {
                let ident = path_of_ident(last.ident.clone());
                let local = Type::Path(TypePath {
                    qself: None,
                    path: ident,
                });
                if descriptors.get(&local).is_some() {
                    abort!(
                        ty.span(),
                        "`{}` is defined in this module", &last.ident;
                        help = "name the subtype as `{}`", &last.ident
                    )
                }
            }
            _ => (),
        }
    }
    let mut taken: HashSet<String> = kept
        .iter()
        .filter_map(|item| match item {
            Item::Struct(s) => Some(s.ident.to_string()),
            Item::Enum(e) => Some(e.ident.to_string()),
            Item::Type(t) => Some(t.ident.to_string()),
            Item::Trait(t) => Some(t.ident.to_string()),
            Item::Union(u) => Some(u.ident.to_string()),
            _ => None,
        })
        .collect();
    for wrapper in &wrappers {
        if !taken.insert(wrapper.ident.to_string()) {
            abort!(wrapper.ident.span(), "The name `{}` is defined twice", &wrapper.ident)
        }
    }
    let mut registry = Registry::new(&descriptors, taken);
    for wrapper in wrappers {
        registry.declare(wrapper);
    }
    let generated = registry.expand(&krate);
    kept.push(Item::Verbatim(generated));
    *items = kept;
    quote! { #item_mod }
}

fn inner(args: &Arguments, input: TokenStream) -> TokenStream {
    if let Ok(item_mod) = parse2::<ItemMod>(input.clone()) {
        expand_module(args, item_mod)
    } else if let Ok(item_enum) = parse2::<ItemEnum>(input.clone()) {
        abort!(
            item_enum.ident.span(),
            "A wrapper enum must be declared inside a module annotated with `#[superstruct]`";
            help = "subtype members are read from the structs and impls of that module"
        )
    } else {
        abort!(input.span(), "This element is not supported")
    }
}

/// Synthesizes wrapper enums which expose the members common to a closed set of types.
///
/// Place the attribute on an inline module. Every `enum` inside it marked with `#[superstruct]`
/// becomes a wrapper: each variant names a subtype defined in the same module (`Square`, or
/// `Round(Circle)` to pick the variant name). The wrapper gets `From` for each subtype and an
/// accessor for every member all of its subtypes share:
///
/// - `name()` for a field or a zero-argument method,
/// - `set_name(value)` for a field or a `set_name` method,
/// - `name(a, b, ..)` for a method taking arguments.
///
/// Only `pub` (or `pub(..)`) members take part, and names starting with `__` never do.
///
/// ```
/// #[superstruct::superstruct]
/// mod shapes {
///     pub struct Square { pub size: f64 }
///     impl Square {
///         pub fn area(&self) -> f64 { self.size * self.size }
///     }
///
///     pub struct Circle { pub radius: f64 }
///     impl Circle {
///         pub fn area(&self) -> f64 { std::f64::consts::PI * self.radius * self.radius }
///     }
///
///     #[superstruct]
///     pub enum Shape { Square, Circle }
/// }
///
/// let shape: shapes::Shape = shapes::Square { size: 3.0 }.into();
/// assert_eq!(shape.area(), 9.0);
/// ```
///
/// When the subtypes disagree on a return type, the accessor returns their common type if one
/// exists (`i32` and `i64` give `i64`), the wrapper itself if the types are exactly its subtypes
/// (methods returning `Self`), or a nested wrapper named `<Wrapper><Member>` over the distinct
/// types. `#[superstruct(nested_derive(Debug, PartialEq))]` on the wrapper derives traits for those
/// nested wrappers.
///
/// On members, `#[superstruct(skip)]` hides a member, `#[superstruct(rename = "name")]` exposes
/// it under another name and `#[superstruct(setter = "name")]` marks a one-argument method as the
/// setter of `name`.
#[proc_macro_error]
#[proc_macro_attribute]
pub fn superstruct(attr: TokenStream1, input: TokenStream1) -> TokenStream1 {
    inner(&parse_macro_input!(attr as Arguments), input.into()).into()
}
