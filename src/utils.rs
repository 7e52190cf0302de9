//! Small shared helpers.

/// Push `item` onto `items` unless an equal element is already present.
///
/// Keeps first-occurrence order, which is what selection lists need: the
/// emitted column order is stable and duplicate requests collapse silently.
pub fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}
