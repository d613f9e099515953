//! Cyclic page rotation

/// Window of at most `limit` items taken after rotating `ordered` left by
/// `(page * limit) mod len`.
///
/// Lists no longer than `limit` come back whole regardless of `page`. Paging is
/// approximate: when `limit` does not divide the length, consecutive pages can
/// repeat items.
pub fn rotate_page<T: Clone>(ordered: &[T], limit: usize, page: usize) -> Vec<T> {
    let len = ordered.len();
    if len <= limit {
        return ordered.to_vec();
    }

    // (page * limit) mod len without overflowing on large pages
    let offset = ((page % len) * (limit % len)) % len;
    ordered.iter().cycle().skip(offset).take(limit).cloned().collect()
}
