use super::*;

#[test]
fn test_position_ordering_is_line_major() {
    assert!(Position::new(1, 40) < Position::new(2, 0));
    assert!(Position::new(3, 2) < Position::new(3, 5));
    assert_eq!(Position::new(4, 4).cmp(&Position::new(4, 4)), Ordering::Equal);
}

#[test]
fn test_contains_is_half_open() {
    let loc = SourceLocation::from_coords((2, 4), (5, 1));
    assert!(loc.contains(Position::new(2, 4)));
    assert!(loc.contains(Position::new(3, 0)));
    assert!(loc.contains(Position::new(5, 0)));
    assert!(!loc.contains(Position::new(5, 1)));
    assert!(!loc.contains(Position::new(2, 3)));
}

#[test]
fn test_encloses_and_to() {
    let outer = SourceLocation::from_coords((1, 0), (10, 0));
    let inner = SourceLocation::from_coords((3, 2), (4, 8));
    assert!(outer.encloses(&inner));
    assert!(!inner.encloses(&outer));

    let joined = inner.to(SourceLocation::from_coords((6, 0), (6, 3)));
    assert_eq!(joined, SourceLocation::from_coords((3, 2), (6, 3)));
}

#[test]
fn test_extent_orders_nested_ranges() {
    let wide = SourceLocation::from_coords((1, 0), (3, 0));
    let narrow = SourceLocation::from_coords((2, 2), (2, 9));
    assert!(narrow.extent() < wide.extent());
}
