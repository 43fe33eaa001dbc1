use super::descriptor::{MemberKey, Receiver, Signature, SubtypeDescriptor};
use super::unify::{borrows, distinct};
use proc_macro2::Span;
use syn::*;

/// Resolves `key` on one subtype. Opaque subtypes (`None`) resolve nothing.
pub fn try_resolve<'a>(
    subtype: Option<&'a SubtypeDescriptor>,
    key: &MemberKey,
) -> Option<&'a Signature> {
    subtype?.members.get(key)
}

/// Resolves `key` on every subtype, or `None` as soon as one of them lacks it.
pub fn resolve_all<'a>(
    subtypes: &[Option<&'a SubtypeDescriptor>],
    key: &MemberKey,
) -> Option<Vec<&'a Signature>> {
    subtypes
        .iter()
        .map(|subtype| try_resolve(*subtype, key))
        .collect()
}

/// One parameter of a synthesized accessor.
#[derive(Clone, Debug)]
pub enum ArgSlot {
    /// Any `V` convertible into the declared type of every subtype at this position.
    Generic { param: Ident, bounds: Vec<Type> },
    /// All subtypes declare the same borrowed type; it is passed through as is.
    Exact(Type),
}

impl ArgSlot {
    pub fn ty(&self) -> Type {
        match self {
            ArgSlot::Generic { param, .. } => parse_quote!(#param),
            ArgSlot::Exact(ty) => ty.clone(),
        }
    }
}

/// Builds the accessor parameters, correlating the subtypes' arguments positionally.
pub fn argument_slots(signatures: &[&Signature]) -> std::result::Result<Vec<ArgSlot>, &'static str> {
    let arity = signatures.first().map(|sig| sig.inputs.len()).unwrap_or(0);
    (0..arity)
        .map(|n| {
            let types = distinct(signatures.iter().map(|sig| &sig.inputs[n]));
            if types.iter().any(borrows) {
                if types.len() == 1 {
                    Ok(ArgSlot::Exact(types[0].clone()))
                } else {
                    Err("takes differing borrowed arguments")
                }
            } else {
                Ok(ArgSlot::Generic {
                    param: Ident::new(&format!("__SuperstructArg{}", n), Span::call_site()),
                    bounds: types,
                })
            }
        })
        .collect()
}

/// The strongest receiver any subtype needs.
pub fn receiver_of(signatures: &[&Signature]) -> Receiver {
    signatures
        .iter()
        .map(|sig| sig.receiver)
        .max()
        .unwrap_or(Receiver::Ref)
}

/// Parameter names of the accessor, taken from the first subtype.
pub fn argument_names(signatures: &[&Signature]) -> Vec<Ident> {
    signatures
        .first()
        .map(|sig| sig.arg_names.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Descriptors, MemberShape};

    fn collect(mut file: File) -> Descriptors {
        Descriptors::collect(&mut file.items)
    }

    #[test]
    fn shapes_resolve_independently() {
        let d = collect(parse_quote! {
            pub struct A { pub top: i32 }
            pub struct B { top: i32 }
            impl B {
                pub fn top(&self) -> i32 { self.top }
                pub fn set_top(&mut self, top: i64) { self.top = top as i32 }
            }
        });
        let a = d.get(&parse_quote!(A));
        let b = d.get(&parse_quote!(B));
        let read = MemberKey::new("top", MemberShape::Read);
        let write = MemberKey::new("top", MemberShape::Write);
        let call = MemberKey::new("top", MemberShape::Call(1));
        assert!(resolve_all(&[a, b], &read).is_some());
        assert!(resolve_all(&[a, b], &call).is_none());
        let writes = resolve_all(&[a, b], &write).unwrap();
        assert_eq!(receiver_of(&writes), Receiver::RefMut);
        let slots = argument_slots(&writes).unwrap();
        match &slots[0] {
            ArgSlot::Generic { bounds, .. } => {
                let expected: Vec<Type> = vec![parse_quote!(i32), parse_quote!(i64)];
                assert_eq!(bounds, &expected)
            }
            o => panic!("{:?}", o),
        }
        assert!(resolve_all(&[a, b, None], &read).is_none());
    }

    #[test]
    fn borrowed_arguments() {
        let d = collect(parse_quote! {
            pub struct A;
            pub struct B;
            pub struct C;
            impl A { pub fn greet(&self, name: &str) -> String { name.to_owned() } }
            impl B { pub fn greet(&self, who: &str) -> String { who.to_owned() } }
            impl C { pub fn greet(&self, name: &String) -> String { name.clone() } }
        });
        let key = MemberKey::new("greet", MemberShape::Call(1));
        let ab = resolve_all(&[d.get(&parse_quote!(A)), d.get(&parse_quote!(B))], &key).unwrap();
        assert!(matches!(&argument_slots(&ab).unwrap()[0], ArgSlot::Exact(_)));
        assert_eq!(argument_names(&ab)[0], "name");
        let ac = resolve_all(&[d.get(&parse_quote!(A)), d.get(&parse_quote!(C))], &key).unwrap();
        assert!(argument_slots(&ac).is_err());
    }
}
