use super::synth::WrapperDef;
use proc_macro2::TokenStream;
use syn::*;
use template_quote::quote;

/// Human readable subtype name, `Vec < u8 >` printed as `Vec<u8>`.
fn display_type(ty: &Type) -> String {
    let mut out = String::new();
    let tokens = quote!(#ty).to_string();
    let mut chars = tokens.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ' ' {
            let prev = out.chars().last();
            let next = chars.peek().copied();
            let tight = |c: Option<char>| matches!(c, Some('<' | '>' | ':' | '&' | '(' | '[' | ')' | ']' | ','));
            if tight(next) || matches!(prev, Some('<' | ':' | '&' | '(' | '[')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Emits the enum itself together with construction, extraction and visiting.
pub fn emit(wrapper: &WrapperDef, krate: &Path) -> TokenStream {
    let WrapperDef {
        ident,
        vis,
        attrs,
        variants,
        ..
    } = wrapper;
    let names = variants
        .iter()
        .map(|(_, ty)| display_type(ty))
        .collect::<Vec<_>>();
    let Some(((_, first_ty), rest)) = variants.split_first() else {
        return TokenStream::new();
    };
    let rest = rest.iter().map(|(_, ty)| ty).collect::<Vec<_>>();
    quote! {
        #(#attrs)*
        #vis enum #ident {
            #(for (variant, ty) in variants) {
                #variant(#ty),
            }
        }

        impl #krate::SuperStruct for #ident {
            const SUBTYPES: &'static [&'static str] = &[#(#names),*];

            fn tag(&self) -> usize {
                match self {
                    #(for (n, (variant, _)) in variants.iter().enumerate()) {
                        Self::#variant(_) => #n,
                    }
                }
            }
        }

        #(for (n, (variant, ty)) in variants.iter().enumerate()) {
            impl ::core::convert::From<#ty> for #ident {
                #[inline]
                fn from(value: #ty) -> Self {
                    Self::#variant(value)
                }
            }

            impl ::core::convert::TryFrom<#ident> for #ty {
                type Error = #ident;

                #[allow(unreachable_patterns)]
                fn try_from(wrapper: #ident) -> ::core::result::Result<Self, #ident> {
                    match wrapper {
                        #ident::#variant(value) => ::core::result::Result::Ok(value),
                        other => ::core::result::Result::Err(other),
                    }
                }
            }

            impl #krate::Subtype<#ident> for #ty {
                const TAG: usize = #n;

                #[inline]
                fn wrap(self) -> #ident {
                    #ident::#variant(self)
                }

                #[allow(unreachable_patterns)]
                fn project(wrapper: &#ident) -> ::core::option::Option<&Self> {
                    match wrapper {
                        #ident::#variant(value) => ::core::option::Option::Some(value),
                        _ => ::core::option::Option::None,
                    }
                }

                #[allow(unreachable_patterns)]
                fn project_mut(wrapper: &mut #ident) -> ::core::option::Option<&mut Self> {
                    match wrapper {
                        #ident::#variant(value) => ::core::option::Option::Some(value),
                        _ => ::core::option::Option::None,
                    }
                }

                #[allow(unreachable_patterns)]
                fn extract(wrapper: #ident) -> ::core::result::Result<Self, #ident> {
                    match wrapper {
                        #ident::#variant(value) => ::core::result::Result::Ok(value),
                        other => ::core::result::Result::Err(other),
                    }
                }
            }
        }

        #[allow(dead_code)]
        impl #ident {
            /// Applies `visitor` to the active subtype.
            #vis fn visit<__SuperstructVisitor>(
                &self,
                visitor: __SuperstructVisitor,
            ) -> <__SuperstructVisitor as #krate::Visit<#first_ty>>::Output
            where
                __SuperstructVisitor: #krate::Visit<#first_ty>,
                #(for ty in &rest) {
                    __SuperstructVisitor: #krate::Visit<
                        #ty,
                        Output = <__SuperstructVisitor as #krate::Visit<#first_ty>>::Output,
                    >,
                }
            {
                match self {
                    #(for (variant, ty) in variants) {
                        Self::#variant(value) => <__SuperstructVisitor as #krate::Visit<#ty>>::visit(visitor, value),
                    }
                }
            }

            /// Applies `visitor` to the active subtype, which it may modify.
            #vis fn visit_mut<__SuperstructVisitor>(
                &mut self,
                visitor: __SuperstructVisitor,
            ) -> <__SuperstructVisitor as #krate::VisitMut<#first_ty>>::Output
            where
                __SuperstructVisitor: #krate::VisitMut<#first_ty>,
                #(for ty in &rest) {
                    __SuperstructVisitor: #krate::VisitMut<
                        #ty,
                        Output = <__SuperstructVisitor as #krate::VisitMut<#first_ty>>::Output,
                    >,
                }
            {
                match self {
                    #(for (variant, ty) in variants) {
                        Self::#variant(value) => <__SuperstructVisitor as #krate::VisitMut<#ty>>::visit_mut(visitor, value),
                    }
                }
            }
        }
    }
}
