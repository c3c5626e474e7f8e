//! Unit tests for SMA indicator

use marketlens::indicators::trend::calculate_sma;

#[test]
fn test_sma_insufficient_data() {
    assert!(calculate_sma(&[1.0], 2).is_empty());
}

#[test]
fn test_sma_window() {
    let sma = calculate_sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 2);
    assert_eq!(sma, vec![0.0, 1.5, 2.5, 3.5, 4.5]);
}
