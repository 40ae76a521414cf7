pub mod css;

use crate::cli::Variant;

pub use css::StyleSheet;

/// A live style system the theme applier writes into.
///
/// Property names are the bare variable names from
/// [`SLOT_NAMES`](crate::theme::SLOT_NAMES); values use the `"H S% L%"` form.
pub trait StyleTarget {
    /// Select which static theme is in effect underneath any overrides.
    fn set_color_scheme(&mut self, variant: Variant);

    fn set_property(&mut self, name: &str, value: &str);

    fn remove_property(&mut self, name: &str);
}
