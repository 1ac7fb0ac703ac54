// vim: tw=80
//! Proc Macros for use with Decoy
//!
//! You probably don't want to use this crate directly.  Instead, use its
//! reexports via the [`decoy`](../decoy/index.html) crate.

extern crate proc_macro;

mod mockable;

use crate::mockable::do_mockable;

/// Generate a mock object for a trait.
///
/// The generated struct is named after the trait with "Mock" prepended,
/// unless a different name is given as the attribute's argument.  It wraps a
/// `decoy::MockObject`, implements `decoy::Mock` and the trait itself, and
/// every trait method dispatches through the `Mockery` that created it.
///
/// Arguments passed by value must be `Debug + Send + 'static`.  Arguments
/// passed by shared reference are recorded with `ToOwned`, and arguments
/// passed by mutable reference are recorded with `Clone` and written back
/// after the call.
///
/// # Examples
/// ```ignore
/// use decoy::*;
///
/// #[mockable(FakeStore)]
/// trait Store {
///     fn put(&mut self, key: &str, value: u32);
///     fn get(&self, key: &str) -> Option<u32>;
/// }
///
/// let mockery = Mockery::new();
/// let mut store = FakeStore::new(&mockery, "store");
/// mockery.expect(&store)
///     .method("put")
///     .with(vec![matcher::eq("x"), matcher::eq(5u32)]);
/// store.put("x", 5);
/// ```
#[proc_macro_attribute]
pub fn mockable(attrs: proc_macro::TokenStream, input: proc_macro::TokenStream)
    -> proc_macro::TokenStream
{
    do_mockable(attrs.into(), input.into()).into()
}
