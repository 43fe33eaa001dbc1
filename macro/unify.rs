use super::{camel, path_of_ident, type_key};
use proc_macro2::Span;
use std::collections::HashSet;
use syn::*;

/// Outcome of unifying the return types of one member across all subtypes.
#[derive(Debug, PartialEq)]
pub enum Unified {
    /// Every subtype returns nothing.
    Unit,
    /// Every subtype's value converts to this type.
    Common(Type),
    /// No type subsumes the others; a wrapper over exactly these types is needed.
    Distinct(Vec<Type>),
    Incompatible(&'static str),
}

// Candidates tried, in order, when no returned type subsumes the others.
const PROMOTIONS: &[&str] = &[
    "i16", "i32", "i64", "i128", "u16", "u32", "u64", "u128", "f32", "f64", "String",
];

/// Lossless `From` conversions between the types known to the engine.
fn widens(from: &str, to: &str) -> bool {
    if from == to {
        return true;
    }
    let targets: &[&str] = match from {
        "u8" => &[
            "u16", "u32", "u64", "u128", "usize", "i16", "i32", "i64", "i128", "isize", "f32",
            "f64",
        ],
        "u16" => &[
            "u32", "u64", "u128", "usize", "i32", "i64", "i128", "f32", "f64",
        ],
        "u32" => &["u64", "u128", "i64", "i128", "f64"],
        "u64" => &["u128", "i128"],
        "i8" => &["i16", "i32", "i64", "i128", "isize", "f32", "f64"],
        "i16" => &["i32", "i64", "i128", "isize", "f32", "f64"],
        "i32" => &["i64", "i128", "f64"],
        "i64" => &["i128"],
        "f32" => &["f64"],
        "&str" => &["String"],
        _ => &[],
    };
    targets.contains(&to)
}

/// Name of `ty` in the conversion table, if it is one of the known types.
fn known_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(TypePath { qself: None, path }) => {
            let ident = path.get_ident()?.to_string();
            match ident.as_str() {
                "u8" | "u16" | "u32" | "u64" | "u128" | "usize" | "i8" | "i16" | "i32" | "i64"
                | "i128" | "isize" | "f32" | "f64" | "String" => Some(ident),
                _ => None,
            }
        }
        Type::Reference(TypeReference {
            mutability: None,
            elem,
            ..
        }) if matches!(elem.as_ref(), Type::Path(p) if p.path.is_ident("str")) => {
            Some("&str".to_owned())
        }
        Type::Paren(p) => known_name(&p.elem),
        _ => None,
    }
}

/// Finds one type every type in `types` converts to without loss.
pub fn common_supertype(types: &[Type]) -> Option<Type> {
    let names = types.iter().map(known_name).collect::<Option<Vec<_>>>()?;
    let fits = |candidate: &str| names.iter().all(|name| widens(name, candidate));
    // Borrows differing only in lifetime cannot stand for each other.
    let borrowed = types.iter().filter(|ty| borrows(ty)).count();
    if let Some(i) =
        (0..types.len()).find(|&i| fits(&names[i]) && (borrowed < 2 || !borrows(&types[i])))
    {
        return Some(types[i].clone());
    }
    PROMOTIONS
        .iter()
        .find(|candidate| fits(candidate))
        .map(|candidate| {
            Type::Path(TypePath {
                qself: None,
                path: path_of_ident(Ident::new(candidate, Span::call_site())),
            })
        })
}

/// Whether the type mentions a borrow, a lifetime or an anonymous type.
pub fn borrows(ty: &Type) -> bool {
    use syn::visit::Visit;
    struct Visitor(bool);
    impl<'a> Visit<'a> for Visitor {
        fn visit_type(&mut self, i: &'a Type) {
            match i {
                Type::Reference(_)
                | Type::ImplTrait(_)
                | Type::Infer(_)
                | Type::Ptr(_)
                | Type::TraitObject(_) => {
                    self.0 = true;
                }
                _ => syn::visit::visit_type(self, i),
            }
        }
        fn visit_lifetime(&mut self, _: &'a Lifetime) {
            self.0 = true;
        }
    }
    let mut visitor = Visitor(false);
    visitor.visit_type(ty);
    visitor.0
}

/// Types in first-seen order, duplicates removed.
pub fn distinct<'a>(types: impl IntoIterator<Item = &'a Type>) -> Vec<Type> {
    let mut seen = HashSet::new();
    types
        .into_iter()
        .filter(|ty| seen.insert(type_key(ty)))
        .cloned()
        .collect()
}

/// Unifies per-subtype return types, `None` standing for a member returning nothing.
pub fn unify(returns: &[Option<Type>]) -> Unified {
    if returns.iter().all(Option::is_none) {
        return Unified::Unit;
    }
    if returns.iter().any(Option::is_none) {
        return Unified::Incompatible("returns a value on some subtypes and nothing on others");
    }
    let types = distinct(returns.iter().flatten());
    if types.len() == 1 {
        return Unified::Common(types[0].clone());
    }
    if let Some(ty) = common_supertype(&types) {
        return Unified::Common(ty);
    }
    if types.iter().any(borrows) {
        return Unified::Incompatible("returns differing borrowed types");
    }
    Unified::Distinct(types)
}

/// Variant name of a nested wrapper for a returned type: `i32` -> `I32`, `Vec<u8>` -> `VecU8`.
pub fn variant_name(ty: &Type) -> String {
    match ty {
        Type::Path(TypePath { path, .. }) => path
            .segments
            .last()
            .map(|segment| {
                let mut name = camel(&segment.ident.to_string());
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    for arg in &args.args {
                        if let GenericArgument::Type(ty) = arg {
                            name.push_str(&variant_name(ty));
                        }
                    }
                }
                name
            })
            .unwrap_or_default(),
        Type::Tuple(t) if t.elems.is_empty() => "Unit".to_owned(),
        Type::Tuple(t) => t.elems.iter().map(variant_name).collect(),
        Type::Array(a) => {
            let len = match &a.len {
                Expr::Lit(ExprLit {
                    lit: Lit::Int(n), ..
                }) => n.base10_digits().to_owned(),
                _ => String::new(),
            };
            format!("{}Array{}", variant_name(&a.elem), len)
        }
        Type::Slice(s) => format!("{}Slice", variant_name(&s.elem)),
        Type::Paren(p) => variant_name(&p.elem),
        Type::Group(g) => variant_name(&g.elem),
        _ => "Value".to_owned(),
    }
}
