//! Label containment hierarchy
//!
//! A label with `k` trailing zero digits contains every label in the
//! half-open range `[label, label + 10^k)`. For example `100` contains
//! `100..=199`, `110` contains `110..=119` and `111` contains only itself.
//!
//! Label `0` is treated as having no trailing zeros, so it contains only
//! itself.

use super::types::Label;

/// Number of trailing zero digits of `label` in base 10 (`0` for label `0`)
pub fn trailing_zeros(label: Label) -> u32 {
    if label == 0 {
        return 0;
    }

    let mut value = label;
    let mut zeros = 0;
    while value % 10 == 0 {
        value /= 10;
        zeros += 1;
    }
    zeros
}

/// Width of the label range covered by `label`, i.e. `10^k`
pub fn span(label: Label) -> u64 {
    10u64.pow(trailing_zeros(label))
}

/// Whether `candidate` lies inside the range covered by `parent`.
///
/// Returns `false` when `candidate < parent`; the difference is only taken
/// once the ordering is known.
pub fn is_subregion(parent: Label, candidate: Label) -> bool {
    if candidate < parent {
        return false;
    }
    u64::from(candidate - parent) < span(parent)
}
