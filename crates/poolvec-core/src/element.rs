//! Element capability: may values of a type be duplicated by raw byte copy?
//!
//! Bulk copy and fill consult [`Element::BITWISE`] at compile time. Bitwise
//! types take a single `memcpy`/`memset`-style path; everything else is
//! cloned slot by slot with rollback if a clone panics.
//!
//! Moving values never needs this query: a Rust move is always a bitwise
//! copy that cannot fail.

use std::rc::Rc;
use std::sync::Arc;

/// A value type storable in a `DynamicArray`.
///
/// # Safety
///
/// Setting `BITWISE = true` asserts that a byte-for-byte copy of a value is
/// a valid, independent duplicate equivalent to `clone()`, and that the
/// type has no drop glue. In practice this means the type is `Copy`. Use
/// [`trivial_element!`](crate::trivial_element) to get this checked.
pub unsafe trait Element: Clone {
    const BITWISE: bool = false;
}

/// Implements [`Element`] with the bitwise fast path for `Copy` types.
///
/// ```
/// # use poolvec_core::trivial_element;
/// #[derive(Clone, Copy)]
/// struct Point { x: f32, y: f32 }
/// trivial_element!(Point);
/// ```
#[macro_export]
macro_rules! trivial_element {
    ($($ty:ty),+ $(,)?) => {$(
        // SAFETY: `$ty: Copy` is enforced when `BITWISE` is evaluated.
        unsafe impl $crate::Element for $ty {
            const BITWISE: bool = {
                const fn assert_copy<T: ::core::marker::Copy>() {}
                assert_copy::<$ty>();
                true
            };
        }
    )+};
}

/// Implements [`Element`] with the clone-per-slot path.
#[macro_export]
macro_rules! element {
    ($($ty:ty),+ $(,)?) => {$(
        // SAFETY: `BITWISE` stays false, so values are only ever cloned.
        unsafe impl $crate::Element for $ty {}
    )+};
}

trivial_element!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool, char, ()
);

element!(String);

// SAFETY: shared references are `Copy`.
unsafe impl<T: ?Sized> Element for &T {
    const BITWISE: bool = true;
}

// SAFETY: an array is bitwise exactly when its element is.
unsafe impl<T: Element, const N: usize> Element for [T; N] {
    const BITWISE: bool = T::BITWISE;
}

// SAFETY: `None` carries no payload; `Some` is bitwise exactly when `T` is.
unsafe impl<T: Element> Element for Option<T> {
    const BITWISE: bool = T::BITWISE;
}

// SAFETY: owning and counted pointers always take the clone path.
unsafe impl<T: Clone> Element for Vec<T> {}
unsafe impl<T: Clone> Element for Box<T> {}
unsafe impl<T: ?Sized> Element for Rc<T> {}
unsafe impl<T: ?Sized> Element for Arc<T> {}

macro_rules! tuple_element {
    ($($name:ident),+) => {
        // SAFETY: a tuple is bitwise exactly when every field is.
        unsafe impl<$($name: Element),+> Element for ($($name,)+) {
            const BITWISE: bool = true $(&& $name::BITWISE)+;
        }
    };
}

tuple_element!(A);
tuple_element!(A, B);
tuple_element!(A, B, C);
tuple_element!(A, B, C, D);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy)]
    struct Pixel {
        _rgb: [u8; 3],
    }
    trivial_element!(Pixel);

    #[derive(Clone)]
    struct Named {
        _name: String,
    }
    element!(Named);

    #[test]
    fn scalars_and_user_copy_types_are_bitwise() {
        assert!(u8::BITWISE);
        assert!(f64::BITWISE);
        assert!(<&str>::BITWISE);
        assert!(Pixel::BITWISE);
        assert!(<[Pixel; 4]>::BITWISE);
        assert!(<(u32, char, bool)>::BITWISE);
        assert!(<Option<i64>>::BITWISE);
    }

    #[test]
    fn owning_types_take_the_clone_path() {
        assert!(!String::BITWISE);
        assert!(!Named::BITWISE);
        assert!(!<Vec<u8>>::BITWISE);
        assert!(!<Rc<str>>::BITWISE);
        assert!(!<(u32, String)>::BITWISE);
        assert!(!<Option<Box<u8>>>::BITWISE);
        assert!(!<[String; 2]>::BITWISE);
    }
}
