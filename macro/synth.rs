use super::descriptor::{Descriptors, MemberKey, MemberShape, SubtypeDescriptor, Target};
use super::dispatch::Accessor;
use super::resolve::{argument_names, argument_slots, receiver_of, resolve_all};
use super::unify::{distinct, unify, variant_name, Unified};
use super::{camel, path_of_ident, store, type_key};
use proc_macro2::{Span, TokenStream};
use proc_macro_error::{abort, emit_warning};
use std::collections::{BTreeSet, HashMap, HashSet};
use syn::spanned::Spanned;
use syn::*;
use template_quote::quote;

// Inherent methods every wrapper already has.
const RESERVED: &[&str] = &["visit", "visit_mut"];

#[derive(Clone)]
pub struct WrapperDef {
    pub ident: Ident,
    pub vis: Visibility,
    pub attrs: Vec<Attribute>,
    pub variants: Vec<(Ident, Type)>,
    pub nested_derive: Vec<Path>,
    /// The wrapper and member a nested wrapper was created for.
    pub owner: Option<(Ident, String)>,
}

impl WrapperDef {
    fn set_key(&self) -> Vec<String> {
        let mut key = self
            .variants
            .iter()
            .map(|(_, ty)| type_key(ty))
            .collect::<Vec<_>>();
        key.sort();
        key
    }
}

/// Every wrapper of a module, declared or nested, each synthesized once per distinct type set.
pub struct Registry<'a> {
    descriptors: &'a Descriptors,
    wrappers: Vec<WrapperDef>,
    by_set: HashMap<Vec<String>, usize>,
    taken: HashSet<String>,
}

impl<'a> Registry<'a> {
    pub fn new(descriptors: &'a Descriptors, taken: HashSet<String>) -> Self {
        Self {
            descriptors,
            wrappers: Vec::new(),
            by_set: HashMap::new(),
            taken,
        }
    }

    pub fn declare(&mut self, wrapper: WrapperDef) {
        let mut seen = HashMap::new();
        for (variant, ty) in &wrapper.variants {
            if let Some(prev) = seen.insert(type_key(ty), variant) {
                abort!(
                    ty.span(),
                    "`{}` is already held by variant `{}`",
                    type_key(ty),
                    prev
                )
            }
        }
        let mut variant_names = HashSet::new();
        for (variant, _) in &wrapper.variants {
            if !variant_names.insert(variant.to_string()) {
                abort!(variant.span(), "Duplicate variant `{}`", variant)
            }
        }
        self.by_set
            .entry(wrapper.set_key())
            .or_insert(self.wrappers.len());
        self.wrappers.push(wrapper);
    }

    fn fresh_ident(&mut self, base: String) -> Ident {
        let mut name = base.clone();
        let mut n = 2;
        while !self.taken.insert(name.clone()) {
            name = format!("{}{}", base, n);
            n += 1;
        }
        Ident::new(&name, Span::call_site())
    }

    /// The wrapper over exactly `types`: an existing one with the same set, or a new nested one.
    fn wrapper_for(&mut self, owner: usize, member: &str, types: Vec<Type>) -> Ident {
        let mut key = types.iter().map(type_key).collect::<Vec<_>>();
        key.sort();
        if let Some(&index) = self.by_set.get(&key) {
            return self.wrappers[index].ident.clone();
        }
        let parent = self.wrappers[owner].clone();
        let ident = self.fresh_ident(format!("{}{}", parent.ident, camel(member)));
        let mut variant_names = HashSet::new();
        let variants = types
            .into_iter()
            .map(|ty| {
                let base = variant_name(&ty);
                let mut name = base.clone();
                let mut n = 2;
                while !variant_names.insert(name.clone()) {
                    name = format!("{}{}", base, n);
                    n += 1;
                }
                (Ident::new(&name, Span::call_site()), ty)
            })
            .collect::<Vec<_>>();
        let doc = format!(
            "Values returned by `{}::{}`, one variant per subtype return type.",
            parent.ident, member
        );
        let derive = &parent.nested_derive;
        let attrs: Vec<Attribute> = if derive.is_empty() {
            vec![parse_quote!(#[doc = #doc])]
        } else {
            vec![
                parse_quote!(#[doc = #doc]),
                parse_quote!(#[derive(#(#derive),*)]),
            ]
        };
        let nested = WrapperDef {
            ident: ident.clone(),
            vis: parent.vis.clone(),
            attrs,
            variants,
            nested_derive: parent.nested_derive.clone(),
            owner: Some((parent.ident.clone(), member.to_owned())),
        };
        self.by_set.insert(key, self.wrappers.len());
        self.wrappers.push(nested);
        ident
    }

    /// Emits one accessor per member resolvable on every subtype of the wrapper at `index`.
    fn synthesize(&mut self, index: usize) -> TokenStream {
        let descriptors = self.descriptors;
        let wrapper = self.wrappers[index].clone();
        let subtypes: Vec<Option<&SubtypeDescriptor>> = wrapper
            .variants
            .iter()
            .map(|(_, ty)| descriptors.get(ty))
            .collect();
        if wrapper.owner.is_none() && subtypes.iter().any(Option::is_none) {
            emit_warning!(
                wrapper.ident.span(),
                "Some subtypes of `{}` are not defined in this module; no member is forwarded",
                &wrapper.ident
            );
        }
        // Union of the names; the intersection is left to resolution.
        let keys: BTreeSet<&MemberKey> = subtypes
            .iter()
            .flatten()
            .flat_map(|subtype| subtype.members.keys())
            .collect();
        let mut emitted = HashSet::new();
        let mut accessors = Vec::new();
        for key in keys {
            let Some(signatures) = resolve_all(&subtypes, key) else {
                continue;
            };
            let name = key.accessor_name();
            if RESERVED.contains(&name.as_str()) {
                emit_warning!(
                    wrapper.ident.span(),
                    "`{}` is not forwarded: the name is used by the wrapper itself",
                    name
                );
                continue;
            }
            if emitted.contains(&name) {
                emit_warning!(
                    wrapper.ident.span(),
                    "`{}` is not forwarded: another member already uses the name",
                    name
                );
                continue;
            }
            let slots = match argument_slots(&signatures) {
                Ok(slots) => slots,
                Err(reason) => {
                    emit_warning!(wrapper.ident.span(), "`{}` is not forwarded: it {}", name, reason);
                    continue;
                }
            };
            // Fields which may not be `Clone` are only read by reference, and only when every
            // subtype holds the same type.
            let by_ref = if key.shape == MemberShape::Read {
                let fields = signatures
                    .iter()
                    .filter(|sig| matches!(sig.target, Target::Field(_)))
                    .filter_map(|sig| sig.output.as_ref())
                    .collect::<Vec<_>>();
                if fields.iter().all(|ty| descriptors.is_clone(ty)) {
                    false
                } else if fields.len() == signatures.len() && distinct(fields).len() == 1 {
                    true
                } else {
                    emit_warning!(
                        wrapper.ident.span(),
                        "`{}` is not forwarded: reading it would clone a field",
                        name
                    );
                    continue;
                }
            } else {
                false
            };
            let returns = signatures
                .iter()
                .map(|sig| sig.output.clone())
                .collect::<Vec<_>>();
            let output = match unify(&returns) {
                Unified::Unit => None,
                Unified::Common(ty) if by_ref => Some(parse_quote!(&#ty)),
                Unified::Common(ty) => Some(ty),
                Unified::Distinct(types) => {
                    let ident = self.wrapper_for(index, &key.name, types);
                    Some(Type::Path(TypePath {
                        qself: None,
                        path: path_of_ident(ident),
                    }))
                }
                Unified::Incompatible(reason) => {
                    emit_warning!(wrapper.ident.span(), "`{}` is not forwarded: it {}", name, reason);
                    continue;
                }
            };
            emitted.insert(name);
            let accessor = Accessor {
                vis: &wrapper.vis,
                key,
                receiver: receiver_of(&signatures),
                names: argument_names(&signatures),
                slots,
                output,
                by_ref,
                arms: wrapper
                    .variants
                    .iter()
                    .map(|(variant, _)| variant)
                    .zip(signatures.iter().copied())
                    .collect(),
            };
            accessors.push(accessor.emit());
        }
        if accessors.is_empty() {
            return TokenStream::new();
        }
        quote! {
            #[allow(dead_code)]
            impl #{&wrapper.ident} {
                #(#accessors)*
            }
        }
    }

    /// Synthesizes every declared wrapper, then every nested wrapper they needed, until no new
    /// wrapper appears.
    pub fn expand(mut self, krate: &Path) -> TokenStream {
        let mut out = TokenStream::new();
        let mut index = 0;
        while index < self.wrappers.len() {
            let accessors = self.synthesize(index);
            out.extend(store::emit(&self.wrappers[index], krate));
            out.extend(accessors);
            index += 1;
        }
        out
    }
}
