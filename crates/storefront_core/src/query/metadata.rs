//! Pagination summary derived from a windowed total count.

use serde::Serialize;

/// Page summary returned alongside list rows.
///
/// The all-zero value means "nothing matched"; it is not an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    pub current_page: u64,
    pub page_size: u64,
    pub first_page: u64,
    pub last_page: u64,
    pub total_records: u64,
}

impl PageMetadata {
    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }
}

/// Computes page metadata. Pure.
///
/// `page` may exceed the computed last page; the result still reports the
/// true total.
pub fn calculate_metadata(total_records: u64, page: u64, page_size: u64) -> PageMetadata {
    if total_records == 0 {
        return PageMetadata::default();
    }

    PageMetadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: total_records.div_ceil(page_size.max(1)),
        total_records,
    }
}

#[cfg(test)]
mod tests {
    use super::{calculate_metadata, PageMetadata};

    #[test]
    fn zero_total_yields_zero_metadata_for_any_paging() {
        for (page, size) in [(1, 20), (7, 1), (10_000_000, 100)] {
            assert_eq!(calculate_metadata(0, page, size), PageMetadata::default());
        }
    }

    #[test]
    fn last_page_rounds_up() {
        let metadata = calculate_metadata(41, 2, 20);
        assert_eq!(metadata.first_page, 1);
        assert_eq!(metadata.last_page, 3);
        assert_eq!(metadata.current_page, 2);
        assert_eq!(metadata.page_size, 20);
        assert_eq!(metadata.total_records, 41);
    }

    #[test]
    fn exact_multiple_does_not_add_a_page() {
        assert_eq!(calculate_metadata(40, 1, 20).last_page, 2);
        assert_eq!(calculate_metadata(1, 1, 100).last_page, 1);
    }

    #[test]
    fn current_page_may_exceed_last_page() {
        let metadata = calculate_metadata(5, 9, 5);
        assert_eq!(metadata.last_page, 1);
        assert_eq!(metadata.current_page, 9);
        assert!(!metadata.is_empty());
    }
}
