use rstest::rstest;

use super::pagination::{PaginationParams, build_page};

#[rstest]
#[case(None, None, 1, 20)]
#[case(Some(0), None, 1, 20)]
#[case(Some(3), Some(0), 3, 1)]
#[case(Some(2), Some(500), 2, 100)]
fn test_pagination_defaults_and_caps(
    #[case] page: Option<u64>,
    #[case] limit: Option<u64>,
    #[case] expected_page: u64,
    #[case] expected_limit: u64,
) {
    let params = PaginationParams::new(page, limit, 20, 100);
    assert_eq!(params.page, expected_page);
    assert_eq!(params.limit, expected_limit);
}

#[test]
fn test_window_is_clamped_to_total() {
    let params = PaginationParams::new(Some(1), Some(10), 20, 100);
    assert_eq!(params.window(25), 0..10);

    let last = PaginationParams::new(Some(3), Some(10), 20, 100);
    assert_eq!(last.window(25), 20..25);

    let beyond = PaginationParams::new(Some(4), Some(10), 20, 100);
    assert!(beyond.window(25).is_empty());

    let huge = PaginationParams::new(Some(u64::MAX), Some(100), 20, 100);
    assert!(huge.window(25).is_empty());
}

#[test]
fn test_build_page_counts_pages() {
    let params = PaginationParams::new(Some(1), Some(10), 20, 100);
    assert_eq!(build_page(0, params).pages, 0);
    assert_eq!(build_page(10, params).pages, 1);
    assert_eq!(build_page(11, params).pages, 2);
}
