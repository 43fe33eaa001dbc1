#![doc = include_str!("README.md")]
#![no_std]

pub use superstruct_macro::superstruct;

/// Implemented by every wrapper generated with [`macro@superstruct`].
///
/// The wrapper always holds exactly one value of one of its subtypes. [`SuperStruct::tag`] tells
/// which one, in the order the variants were declared.
///
/// Members which are not common to every subtype are never generated, so using one is rejected
/// by the compiler:
///
/// ```compile_fail
/// #[superstruct::superstruct]
/// mod m {
///     pub struct A { pub top: i32, pub left: i32 }
///     pub struct B { pub top: i32 }
///
///     #[superstruct]
///     pub enum W { A, B }
/// }
///
/// let w: m::W = m::A { top: 1, left: 2 }.into();
/// let _ = w.left();
/// ```
///
/// A member which is private on any subtype is treated as absent there:
///
/// ```compile_fail
/// #[superstruct::superstruct]
/// mod m {
///     pub struct A { i: i32 }
///     pub struct B { pub i: i32 }
///     impl A { pub fn new() -> Self { A { i: 0 } } }
///
///     #[superstruct]
///     pub enum W { A, B }
/// }
///
/// let w: m::W = m::A::new().into();
/// let _ = w.i();
/// ```
///
/// Setter arguments must be accepted by every subtype, so the narrowest field decides:
///
/// ```compile_fail
/// #[superstruct::superstruct]
/// mod m {
///     pub struct A { pub n: i64 }
///     pub struct B { pub n: i32 }
///
///     #[superstruct]
///     pub enum W { A, B }
/// }
///
/// let mut w: m::W = m::A { n: 0 }.into();
/// w.set_n(1i64);
/// ```
///
/// A member which returns a value on one subtype and nothing on another is not exposed:
///
/// ```compile_fail
/// #[superstruct::superstruct]
/// mod m {
///     pub struct A;
///     pub struct B;
///     impl A { pub fn reset(&mut self) -> bool { true } }
///     impl B { pub fn reset(&mut self) {} }
///
///     #[superstruct]
///     pub enum W { A, B }
/// }
///
/// let mut w: m::W = m::A.into();
/// w.reset();
/// ```
pub trait SuperStruct: Sized {
    /// Names of the subtypes, in declaration order.
    const SUBTYPES: &'static [&'static str];

    /// Index of the active subtype in [`SuperStruct::SUBTYPES`].
    fn tag(&self) -> usize;

    /// Name of the active subtype.
    fn subtype_name(&self) -> &'static str {
        Self::SUBTYPES[self.tag()]
    }

    /// Returns `true` if the active subtype is `T`.
    fn is<T: Subtype<Self>>(&self) -> bool {
        self.tag() == T::TAG
    }

    fn downcast_ref<T: Subtype<Self>>(&self) -> Option<&T> {
        T::project(self)
    }

    fn downcast_mut<T: Subtype<Self>>(&mut self) -> Option<&mut T> {
        T::project_mut(self)
    }

    /// Moves the active value out if it is a `T`, or hands the wrapper back.
    fn downcast<T: Subtype<Self>>(self) -> Result<T, Self> {
        T::extract(self)
    }

    /// Replaces the active value, whatever subtype it was.
    fn assign<T: Subtype<Self>>(&mut self, value: T) {
        *self = value.wrap();
    }
}

/// Implemented for each subtype `Self` of the wrapper `W`.
pub trait Subtype<W>: Sized {
    /// Declaration index of this subtype in `W`.
    const TAG: usize;

    fn wrap(self) -> W;

    fn project(wrapper: &W) -> Option<&Self>;

    fn project_mut(wrapper: &mut W) -> Option<&mut Self>;

    fn extract(wrapper: W) -> Result<Self, W>;
}

/// A visitor accepted by the generated `visit` method.
///
/// The wrapper's `visit` requires `Visit<S>` for every subtype `S`, all with the same `Output`.
///
/// ```
/// use superstruct::Visit;
///
/// #[superstruct::superstruct]
/// mod m {
///     pub struct A(pub u8);
///     pub struct B(pub &'static str);
///
///     #[superstruct]
///     pub enum W { A, B }
/// }
///
/// struct Describe;
/// impl Visit<m::A> for Describe {
///     type Output = String;
///     fn visit(self, value: &m::A) -> String { format!("A({})", value.0) }
/// }
/// impl Visit<m::B> for Describe {
///     type Output = String;
///     fn visit(self, value: &m::B) -> String { format!("B({})", value.0) }
/// }
///
/// let w: m::W = m::B("x").into();
/// assert_eq!(w.visit(Describe), "B(x)");
/// ```
pub trait Visit<T> {
    type Output;

    fn visit(self, value: &T) -> Self::Output;
}

/// Mutable counterpart of [`Visit`], accepted by the generated `visit_mut` method.
pub trait VisitMut<T> {
    type Output;

    fn visit_mut(self, value: &mut T) -> Self::Output;
}

/// Builds a wrapper holding the value at a runtime index.
///
/// Only the selected expression is evaluated. The result is `None` when `index` is out of range.
///
/// ```
/// #[superstruct::superstruct]
/// mod m {
///     pub struct A { pub n: u8 }
///     pub struct B { pub n: u16 }
///
///     #[superstruct]
///     pub enum W { A, B }
/// }
///
/// let picked: Option<m::W> = superstruct::pick!(1; m::A { n: 1 }, m::B { n: 2 });
/// assert_eq!(picked.map(|w| w.n()), Some(2u16));
/// let none: Option<m::W> = superstruct::pick!(2; m::A { n: 1 }, m::B { n: 2 });
/// assert!(none.is_none());
/// ```
#[macro_export]
macro_rules! pick {
    ($index:expr; $($value:expr),+ $(,)?) => {{
        let __superstruct_index: usize = $index;
        let mut __superstruct_n: usize = 0;
        let mut __superstruct_picked = ::core::option::Option::None;
        $(
            if __superstruct_n == __superstruct_index {
                __superstruct_picked =
                    ::core::option::Option::Some(::core::convert::Into::into($value));
            }
            __superstruct_n += 1;
        )+
        let _ = __superstruct_n;
        __superstruct_picked
    }};
}
