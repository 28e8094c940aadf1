//! Procedural macros for fanout.

use proc_macro::TokenStream;

mod delegate;

/// Turn a delegate trait into a multicast contract.
///
/// Every method must take `&self` and return one of:
///
/// - `()` or `Result<(), E>`: a notification, forwarded to every listener
/// - `Option<T>` or `Result<Option<T>, E>`: a query, answered by the first
///   listener that returns `Some`
///
/// Arguments are cloned for each listener, so owned argument types must be
/// `Clone`. Listeners override `responds_to` to opt out of methods.
///
/// # Example
///
/// ```rust,ignore
/// #[fanout::delegate]
/// pub trait TableDelegate {
///     fn did_select(&self, _row: usize) {}
///     fn height_for_row(&self, _row: usize) -> Option<f32> {
///         None
///     }
/// }
///
/// struct Sizer;
///
/// impl TableDelegate for Sizer {
///     fn height_for_row(&self, _row: usize) -> Option<f32> {
///         Some(44.0)
///     }
///
///     fn responds_to(&self) -> fanout::MethodSet {
///         [TableDelegateMethods::HEIGHT_FOR_ROW].into()
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn delegate(attr: TokenStream, item: TokenStream) -> TokenStream {
    delegate::delegate_impl(attr, item)
}
