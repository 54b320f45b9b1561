//! Binary-search bounds on sorted slices.
//!
//! These are `numpy.searchsorted` with `side='left'` / `side='right'`:
//! the insertion index that keeps the slice sorted. The profile and
//! matcher code leans on them to turn "particles within ±r of x" and
//! "halos within a mass window" into index ranges.

/// First index at which `value` could be inserted keeping `slice` sorted
/// (`side='left'`): the count of elements strictly less than `value`.
pub fn lower_bound(slice: &[f64], value: f64) -> usize {
    slice.partition_point(|&x| x < value)
}

/// Last index at which `value` could be inserted keeping `slice` sorted
/// (`side='right'`): the count of elements less than or equal to `value`.
pub fn upper_bound(slice: &[f64], value: f64) -> usize {
    slice.partition_point(|&x| x <= value)
}

/// [`lower_bound`] over a slice of records ordered by `key`.
pub fn lower_bound_by_key<T, F>(slice: &[T], value: f64, key: F) -> usize
where
    F: Fn(&T) -> f64,
{
    slice.partition_point(|item| key(item) < value)
}

/// [`upper_bound`] over a slice of records ordered by `key`.
pub fn upper_bound_by_key<T, F>(slice: &[T], value: f64, key: F) -> usize
where
    F: Fn(&T) -> f64,
{
    slice.partition_point(|item| key(item) <= value)
}
