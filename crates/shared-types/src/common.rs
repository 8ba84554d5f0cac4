/// Number of pages needed to show `total` items, `page_size` at a time.
///
/// Zero matches means zero pages; a zero page size yields zero as well.
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Offset of the first item on a 1-based `page`.
pub fn page_offset(page: u64, page_size: u64) -> u64 {
    page.saturating_mul(page_size).saturating_sub(page_size)
}

/// Coerce a requested page number to the 1-based range.
pub fn normalize_page(page: Option<i64>) -> u64 {
    page.unwrap_or(1).max(1) as u64
}
