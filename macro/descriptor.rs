use super::{path_of_ident, take_superstruct_attrs, type_key};
use darling::util::Flag;
use darling::FromMeta;
use proc_macro2::Span;
use proc_macro_error::abort;
use std::collections::{BTreeMap, HashMap, HashSet};
use syn::spanned::Spanned;
use syn::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Receiver {
    Ref,
    RefMut,
    Value,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Field(Ident),
    Method(Ident),
}

/// How a member is used: read with no argument, written with one, or called with `n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberShape {
    Read,
    Write,
    Call(usize),
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberKey {
    pub name: String,
    pub shape: MemberShape,
}

impl MemberKey {
    pub fn new(name: impl Into<String>, shape: MemberShape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }

    /// Name of the wrapper method forwarding this member.
    pub fn accessor_name(&self) -> String {
        match self.shape {
            MemberShape::Write => format!("set_{}", self.name),
            _ => self.name.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Signature {
    pub receiver: Receiver,
    pub target: Target,
    pub arg_names: Vec<Ident>,
    pub inputs: Vec<Type>,
    pub output: Option<Type>,
}

#[derive(Clone, Debug)]
pub struct SubtypeDescriptor {
    pub ty: Type,
    pub members: BTreeMap<MemberKey, Signature>,
}

#[derive(FromMeta, Default)]
#[darling(default)]
struct MemberArgs {
    skip: Flag,
    rename: Option<Ident>,
    setter: Option<Ident>,
}

pub fn is_accessible(vis: &Visibility) -> bool {
    match vis {
        Visibility::Public(_) => true,
        Visibility::Restricted(r) => !r.path.is_ident("self"),
        Visibility::Inherited => false,
    }
}

/// Replaces `Self` with the concrete type of the subtype.
fn substitute_self(ty: &mut Type, ident: &Ident) {
    use syn::visit_mut::VisitMut;
    struct Visitor<'a>(&'a Ident);
    impl<'a> VisitMut for Visitor<'a> {
        fn visit_path_mut(&mut self, path: &mut Path) {
            if let Some(first) = path.segments.first_mut() {
                if first.ident == "Self" {
                    first.ident = self.0.clone();
                }
            }
            syn::visit_mut::visit_path_mut(self, path)
        }
    }
    Visitor(ident).visit_type_mut(ty)
}

fn contains_impl_trait(ty: &Type) -> bool {
    use syn::visit::Visit;
    struct Visitor(bool);
    impl<'a> Visit<'a> for Visitor {
        fn visit_type_impl_trait(&mut self, _: &'a TypeImplTrait) {
            self.0 = true;
        }
    }
    let mut visitor = Visitor(false);
    visitor.visit_type(ty);
    visitor.0
}

fn output_of(output: &ReturnType) -> Option<Type> {
    match output {
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Tuple(t) if t.elems.is_empty() => None,
            ty => Some(ty.clone()),
        },
        ReturnType::Default => None,
    }
}

fn derives_clone(attrs: &[Attribute]) -> bool {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .any(|attr| {
            attr.parse_args_with(punctuated::Punctuated::<Path, Token![,]>::parse_terminated)
                .map(|paths| {
                    paths.iter().any(|path| {
                        path.segments
                            .last()
                            .map_or(false, |s| s.ident == "Clone" || s.ident == "Copy")
                    })
                })
                .unwrap_or(false)
        })
}

/// Members of every type defined in the module, keyed by [`type_key`].
pub struct Descriptors {
    types: HashMap<String, SubtypeDescriptor>,
    /// Module types deriving or implementing `Clone`.
    cloneable: HashSet<String>,
}

impl Descriptors {
    /// Reads fields of the structs and methods of the inherent impls in `items`. The
    /// `#[superstruct(..)]` attributes on members are consumed.
    pub fn collect(items: &mut [Item]) -> Self {
        let mut descriptors = HashMap::new();
        let mut cloneable = HashSet::new();
        for item in items.iter_mut() {
            match item {
                Item::Struct(item_struct) => {
                    if derives_clone(&item_struct.attrs) {
                        cloneable.insert(item_struct.ident.to_string());
                    }
                    let mut descriptor = SubtypeDescriptor::new(&item_struct.ident);
                    let generic = !item_struct.generics.params.is_empty();
                    if let Fields::Named(fields) = &mut item_struct.fields {
                        for field in fields.named.iter_mut() {
                            let args = take_superstruct_attrs::<MemberArgs>(&mut field.attrs)
                                .unwrap_or_default();
                            if let Some(setter) = &args.setter {
                                abort!(setter.span(), "`setter` only applies to methods")
                            }
                            if generic || args.skip.is_present() || !is_accessible(&field.vis) {
                                continue;
                            }
                            if let Some(ident) = &field.ident {
                                descriptor.add_field(
                                    args.rename.unwrap_or_else(|| ident.clone()),
                                    ident,
                                    &field.ty,
                                    &item_struct.ident,
                                );
                            }
                        }
                    }
                    if !generic {
                        descriptors.insert(type_key(&descriptor.ty), descriptor);
                    }
                }
                Item::Enum(item_enum) if item_enum.generics.params.is_empty() => {
                    if derives_clone(&item_enum.attrs) {
                        cloneable.insert(item_enum.ident.to_string());
                    }
                    let descriptor = SubtypeDescriptor::new(&item_enum.ident);
                    descriptors.insert(type_key(&descriptor.ty), descriptor);
                }
                _ => (),
            }
        }
        // Methods take the `Read` shape over a field of the same name.
        for item in items.iter_mut() {
            let Item::Impl(item_impl) = item else {
                continue;
            };
            if let (Some((None, path, _)), Type::Path(TypePath { qself: None, path: ty })) =
                (&item_impl.trait_, item_impl.self_ty.as_ref())
            {
                let is_clone = path.segments.last().map_or(false, |s| s.ident == "Clone");
                if let (true, Some(ident)) = (is_clone, ty.get_ident()) {
                    cloneable.insert(ident.to_string());
                }
            }
            let self_ident = match (&item_impl.trait_, item_impl.self_ty.as_ref()) {
                (None, Type::Path(TypePath { qself: None, path }))
                    if item_impl.generics.params.is_empty() =>
                {
                    path.get_ident().cloned()
                }
                _ => None,
            };
            for impl_item in item_impl.items.iter_mut() {
                let ImplItem::Fn(impl_fn) = impl_item else {
                    continue;
                };
                let args = take_superstruct_attrs::<MemberArgs>(&mut impl_fn.attrs)
                    .unwrap_or_default();
                let Some(self_ident) = &self_ident else {
                    continue;
                };
                let Some(descriptor) = descriptors.get_mut(&self_ident.to_string()) else {
                    continue;
                };
                if args.skip.is_present() || !is_accessible(&impl_fn.vis) {
                    continue;
                }
                descriptor.add_method(args, &impl_fn.sig, self_ident);
            }
        }
        Self {
            types: descriptors,
            cloneable,
        }
    }

    pub fn get(&self, ty: &Type) -> Option<&SubtypeDescriptor> {
        self.types.get(&type_key(ty))
    }

    /// Whether `ty` is visibly `Clone`: primitives, `String`, shared references, module types
    /// deriving it, and the std containers of those.
    pub fn is_clone(&self, ty: &Type) -> bool {
        match ty {
            Type::Reference(r) => r.mutability.is_none(),
            Type::Paren(p) => self.is_clone(&p.elem),
            Type::Group(g) => self.is_clone(&g.elem),
            Type::Tuple(t) => t.elems.iter().all(|elem| self.is_clone(elem)),
            Type::Array(a) => self.is_clone(&a.elem),
            Type::Path(TypePath { qself: None, path }) => {
                if self.cloneable.contains(&type_key(ty)) {
                    return true;
                }
                let Some(last) = path.segments.last() else {
                    return false;
                };
                let args = match &last.arguments {
                    PathArguments::None => vec![],
                    PathArguments::AngleBracketed(args) => args.args.iter().collect(),
                    PathArguments::Parenthesized(_) => return false,
                };
                let name = last.ident.to_string();
                match name.as_str() {
                    "u8" | "u16" | "u32" | "u64" | "u128" | "usize" | "i8" | "i16" | "i32"
                    | "i64" | "i128" | "isize" | "f32" | "f64" | "bool" | "char" | "String"
                        if args.is_empty() =>
                    {
                        true
                    }
                    "Rc" | "Arc" => true,
                    "Option" | "Vec" | "Box" | "VecDeque" | "BTreeMap" | "BTreeSet"
                    | "HashMap" | "HashSet" | "Result" => args.iter().all(|arg| match arg {
                        GenericArgument::Type(ty) => self.is_clone(ty),
                        _ => true,
                    }),
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

impl SubtypeDescriptor {
    pub fn new(ident: &Ident) -> Self {
        Self {
            ty: Type::Path(TypePath {
                qself: None,
                path: path_of_ident(ident.clone()),
            }),
            members: BTreeMap::new(),
        }
    }

    fn add_field(&mut self, name: Ident, field: &Ident, ty: &Type, self_ident: &Ident) {
        let name = name.to_string();
        if name.starts_with("__") {
            return;
        }
        let mut ty = ty.clone();
        substitute_self(&mut ty, self_ident);
        self.members
            .entry(MemberKey::new(&name, MemberShape::Read))
            .or_insert_with(|| Signature {
                receiver: Receiver::Ref,
                target: Target::Field(field.clone()),
                arg_names: vec![],
                inputs: vec![],
                output: Some(ty.clone()),
            });
        self.members
            .entry(MemberKey::new(&name, MemberShape::Write))
            .or_insert_with(|| Signature {
                receiver: Receiver::RefMut,
                target: Target::Field(field.clone()),
                arg_names: vec![Ident::new("value", Span::call_site())],
                inputs: vec![ty],
                output: None,
            });
    }

    fn add_method(&mut self, args: MemberArgs, sig: &syn::Signature, self_ident: &Ident) {
        if sig.asyncness.is_some()
            || sig.unsafety.is_some()
            || sig.abi.is_some()
            || sig.variadic.is_some()
            || !sig.generics.params.is_empty()
        {
            return;
        }
        let receiver = match sig.receiver() {
            Some(recv) if recv.colon_token.is_none() => match (&recv.reference, &recv.mutability)
            {
                (Some((_, None)), None) => Receiver::Ref,
                (Some((_, None)), Some(_)) => Receiver::RefMut,
                (None, _) => Receiver::Value,
                _ => return,
            },
            _ => return,
        };
        let mut arg_names = Vec::new();
        let mut inputs = Vec::new();
        for (n, input) in sig.inputs.iter().skip(1).enumerate() {
            let FnArg::Typed(pt) = input else {
                return;
            };
            if contains_impl_trait(&pt.ty) {
                return;
            }
            arg_names.push(match pt.pat.as_ref() {
                Pat::Ident(pi) if pi.ident != "self" => pi.ident.clone(),
                _ => Ident::new(&format!("arg{}", n), Span::call_site()),
            });
            let mut ty = pt.ty.as_ref().clone();
            substitute_self(&mut ty, self_ident);
            inputs.push(ty);
        }
        let mut output = output_of(&sig.output);
        if let Some(ty) = &mut output {
            if contains_impl_trait(ty) {
                return;
            }
            substitute_self(ty, self_ident);
        }
        let method = sig.ident.to_string();
        let key = if let Some(setter) = &args.setter {
            if inputs.len() != 1 {
                abort!(sig.span(), "A setter takes exactly one argument")
            }
            MemberKey::new(setter.to_string(), MemberShape::Write)
        } else {
            let name = args
                .rename
                .as_ref()
                .map(|ident| ident.to_string())
                .unwrap_or(method);
            match (inputs.len(), name.strip_prefix("set_")) {
                (0, _) => MemberKey::new(name, MemberShape::Read),
                (1, Some(field)) if !field.is_empty() => {
                    MemberKey::new(field, MemberShape::Write)
                }
                (n, _) => MemberKey::new(name, MemberShape::Call(n)),
            }
        };
        if key.name.starts_with("__") {
            return;
        }
        self.members.insert(
            key,
            Signature {
                receiver,
                target: Target::Method(sig.ident.clone()),
                arg_names,
                inputs,
                output,
            },
        );
    }
}
