use super::descriptor::{MemberKey, MemberShape, Receiver, Signature, Target};
use super::resolve::ArgSlot;
use super::type_key;
use proc_macro2::{Span, TokenStream};
use syn::*;
use template_quote::quote;

/// A member that resolved on every subtype, ready to be emitted.
pub struct Accessor<'a> {
    pub vis: &'a Visibility,
    pub key: &'a MemberKey,
    pub receiver: Receiver,
    pub names: Vec<Ident>,
    pub slots: Vec<ArgSlot>,
    pub output: Option<Type>,
    /// Fields are read by reference instead of cloned.
    pub by_ref: bool,
    /// Variant of the wrapper and the resolved signature of its subtype.
    pub arms: Vec<(&'a Ident, &'a Signature)>,
}

fn value_ident() -> Ident {
    Ident::new("__superstruct_value", Span::call_site())
}

/// Forwards to the member on one subtype, converting arguments into the types that subtype
/// declares and the result into the unified type.
fn arm_expr(
    sig: &Signature,
    names: &[Ident],
    slots: &[ArgSlot],
    output: Option<&Type>,
    by_ref: bool,
) -> TokenStream {
    let value = value_ident();
    let args = names
        .iter()
        .zip(slots)
        .zip(&sig.inputs)
        .map(|((name, slot), ty)| match slot {
            ArgSlot::Generic { param, .. } => {
                quote!(<#param as ::core::convert::Into<#ty>>::into(#name))
            }
            ArgSlot::Exact(_) => quote!(#name),
        })
        .collect::<Vec<_>>();
    let call = match &sig.target {
        Target::Field(field) if args.is_empty() && by_ref => return quote!(&#value.#field),
        Target::Field(field) if args.is_empty() => {
            quote!(::core::clone::Clone::clone(&#value.#field))
        }
        Target::Field(field) => quote!({ #value.#field = #(#args)*; }),
        Target::Method(method) => quote!(#value.#method(#(#args),*)),
    };
    match (output, &sig.output) {
        (Some(output), Some(own)) if type_key(output) != type_key(own) => {
            quote!(::core::convert::Into::<#output>::into(#call))
        }
        _ => call,
    }
}

/// The single entry point every accessor goes through: one exhaustive `match` over the active
/// variant.
pub fn dispatch<'a>(arms: impl IntoIterator<Item = (&'a Ident, TokenStream)>) -> TokenStream {
    let value = value_ident();
    let arms = arms.into_iter().collect::<Vec<_>>();
    quote! {
        match self {
            #(for (variant, expr) in &arms) {
                Self::#variant(#value) => #expr,
            }
        }
    }
}

impl<'a> Accessor<'a> {
    fn doc(&self) -> String {
        match self.key.shape {
            MemberShape::Read => format!("Reads `{}` from the active subtype.", self.key.name),
            MemberShape::Write => format!(
                "Sets `{}` on the active subtype. The value must convert into the type every \
                 subtype declares.",
                self.key.name
            ),
            MemberShape::Call(_) => format!("Calls `{}` on the active subtype.", self.key.name),
        }
    }

    pub fn emit(&self) -> TokenStream {
        let ident = Ident::new(&self.key.accessor_name(), Span::call_site());
        let receiver = match self.receiver {
            Receiver::Ref => quote!(&self),
            Receiver::RefMut => quote!(&mut self),
            Receiver::Value => quote!(self),
        };
        let params = self
            .slots
            .iter()
            .filter_map(|slot| match slot {
                ArgSlot::Generic { param, .. } => Some(param.clone()),
                ArgSlot::Exact(_) => None,
            })
            .collect::<Vec<_>>();
        let predicates = self
            .slots
            .iter()
            .filter_map(|slot| match slot {
                ArgSlot::Generic { param, bounds } => {
                    let mut predicate = quote!(#param:);
                    for (n, bound) in bounds.iter().enumerate() {
                        if n > 0 {
                            predicate.extend(quote!(+));
                        }
                        predicate.extend(quote!(::core::convert::Into<#bound>));
                    }
                    Some(predicate)
                }
                ArgSlot::Exact(_) => None,
            })
            .collect::<Vec<_>>();
        let arms = self.arms.iter().map(|(variant, sig)| {
            (
                *variant,
                arm_expr(
                    sig,
                    &self.names,
                    &self.slots,
                    self.output.as_ref(),
                    self.by_ref,
                ),
            )
        });
        quote! {
            #[doc = #{self.doc()}]
            #[inline]
            #{self.vis} fn #ident
                #(if !params.is_empty()) { <#(#params),*> }
            (
                #receiver
                #(for (name, slot) in self.names.iter().zip(&self.slots)) {
                    , #name: #{slot.ty()}
                }
            )
                #(if let Some(output) = &self.output) { -> #output }
            #(if !predicates.is_empty()) {
                where #(#predicates),*
            }
            {
                #{dispatch(arms)}
            }
        }
    }
}
