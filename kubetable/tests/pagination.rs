use kubetable::{ConfigError, Pagination, paginate};

#[test]
fn test_third_page_of_twenty_five() {
    let rows: Vec<u32> = (1..=25).collect();
    let page = paginate(&rows, 10, 3);

    assert_eq!(page.rows, &[21, 22, 23, 24, 25]);
    assert_eq!(page.info.total_pages, 3);
    assert_eq!(page.info.current_page, 3);
    assert!(!page.info.has_next_page);
    assert!(page.info.has_previous_page);
    assert_eq!((page.info.first_item, page.info.last_item), (21, 25));
}

#[test]
fn test_empty_input() {
    let rows: Vec<u32> = Vec::new();
    let page = paginate(&rows, 10, 1);
    assert!(page.rows.is_empty());
    assert_eq!(page.info.total_items, 0);
    assert_eq!(page.info.total_pages, 1);
    assert_eq!(page.info.current_page, 1);
}

#[test]
fn test_out_of_range_page_is_clamped() {
    let rows: Vec<u32> = (1..=25).collect();
    let page = paginate(&rows, 10, 99);
    assert_eq!(page.info.current_page, 3);
    assert_eq!(page.rows.len(), 5);

    let page = paginate(&rows, 10, 0);
    assert_eq!(page.info.current_page, 1);
    assert_eq!(page.rows.len(), 10);
}

#[test]
fn test_pages_cover_sequence_exactly() {
    for n in [0usize, 1, 9, 10, 11, 37, 100] {
        let rows: Vec<usize> = (0..n).collect();
        for page_size in [1usize, 3, 10, 50] {
            let total_pages = paginate(&rows, page_size, 1).info.total_pages;
            let joined: Vec<usize> = (1..=total_pages)
                .flat_map(|p| paginate(&rows, page_size, p).rows.to_vec())
                .collect();
            assert_eq!(joined, rows, "n={} page_size={}", n, page_size);
        }
    }
}

#[test]
fn test_go_to_page_clamps() {
    let mut p = Pagination::new(10);
    p.set_total_items(25);

    p.go_to_page(0);
    assert_eq!(p.current_page(), 1);

    p.go_to_page(p.total_pages() + 5);
    assert_eq!(p.current_page(), 3);
    assert!(!p.info().range().is_empty());
}

#[test]
fn test_next_and_previous_do_not_wrap() {
    let mut p = Pagination::new(10);
    p.set_total_items(25);

    assert!(!p.go_to_previous_page());
    assert_eq!(p.current_page(), 1);

    assert!(p.go_to_next_page());
    assert!(p.go_to_next_page());
    assert!(!p.go_to_next_page());
    assert_eq!(p.current_page(), 3);
}

#[test]
fn test_change_page_size_resets_to_first_page() {
    let mut p = Pagination::new(10);
    p.set_total_items(100);
    p.go_to_page(5);
    assert_eq!(p.current_page(), 5);

    p.change_page_size(25).unwrap();
    assert_eq!(p.current_page(), 1);
    assert_eq!(p.page_size(), 25);
    assert_eq!(p.total_pages(), 4);
}

#[test]
fn test_zero_page_size_rejected() {
    let mut p = Pagination::new(10);
    assert!(matches!(
        p.change_page_size(0),
        Err(ConfigError::InvalidPageSize(0))
    ));
    assert_eq!(p.page_size(), 10);
}

#[test]
fn test_shrinking_total_resets_out_of_range_page() {
    let mut p = Pagination::new(10);
    p.set_total_items(50);
    p.go_to_page(5);

    // Still in range: page is kept.
    assert!(!p.set_total_items(45));
    assert_eq!(p.current_page(), 5);

    // Page 5 no longer exists.
    assert!(p.set_total_items(12));
    assert_eq!(p.current_page(), 1);
}

#[test]
fn test_first_and_last() {
    let mut p = Pagination::new(7);
    p.set_total_items(30);
    assert!(p.go_to_last_page());
    assert_eq!(p.current_page(), 5);
    assert!(p.go_to_first_page());
    assert_eq!(p.current_page(), 1);
}
