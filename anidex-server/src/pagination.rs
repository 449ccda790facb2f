//! Page arithmetic for record listings

/// Records per page
pub const PAGE_SIZE: i64 = 100;

/// Resolved page position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Current page number (1-indexed, clamped into range)
    pub number: i64,
    /// Total number of pages (0 when there are no results)
    pub total_pages: i64,
    /// Row offset for `LIMIT/OFFSET`
    pub offset: i64,
}

/// Clamp `requested` into `[1, total_pages]` and compute the row offset
pub fn resolve_page(total_results: i64, requested: i64) -> Page {
    let total_pages = (total_results + PAGE_SIZE - 1) / PAGE_SIZE;
    let number = requested.clamp(1, total_pages.max(1));

    Page {
        number,
        total_pages,
        offset: (number - 1) * PAGE_SIZE,
    }
}
