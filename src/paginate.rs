// Fixed-size pagination over an ordered sequence

/// Slice for the 1-based `page_index`. Out-of-range pages (including 0) are empty, not errors.
pub fn paginate<T>(items: &[T], page_size: usize, page_index: usize) -> &[T] {
    if page_size == 0 || page_index == 0 {
        return &[];
    }
    let start = (page_index - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}
