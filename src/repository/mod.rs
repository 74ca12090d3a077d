pub mod coupon_repo;
pub mod order_repo;
pub mod payout_repo;
pub mod product_repo;
pub mod referral_repo;
pub mod repository_error;
pub mod user_repo;

/// Skip offset for a 1-based page. The page number comes straight from the
/// query string, so the arithmetic saturates rather than overflowing.
pub(crate) fn page_skip(page: u64, page_size: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_skip_first_page() {
        assert_eq!(page_skip(1, 20), 0);
        assert_eq!(page_skip(0, 20), 0);
    }

    #[test]
    fn test_page_skip_later_page() {
        assert_eq!(page_skip(3, 20), 40);
    }

    #[test]
    fn test_page_skip_huge_page_saturates() {
        assert_eq!(page_skip(u64::MAX, 10), u64::MAX);
        assert_eq!(page_skip(u64::MAX, u64::MAX), u64::MAX);
    }
}
