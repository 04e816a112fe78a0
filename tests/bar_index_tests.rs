use annot_rs::core::{BarCollection, PriceBar, PriceBarIndex, ScenePoint};

fn flat_bar(x: f64, price: f64) -> PriceBar {
    PriceBar::new(x, price, price, price, price).expect("valid bar")
}

fn collection_at(positions: &[f64]) -> BarCollection {
    let mut collection = BarCollection::new();
    collection.set_bars(positions.iter().map(|&x| flat_bar(x, 100.0)).collect());
    collection
}

#[test]
fn counts_bars_half_open_on_the_left() {
    let collection = collection_at(&[1.0, 2.0, 3.0, 4.0, 5.0]);

    // Bars at 2, 3, 4: the starting bar is excluded, the ending bar counted.
    assert_eq!(collection.count_bars_between(1.0, 4.0), 3);
}

#[test]
fn count_is_direction_independent() {
    let collection = collection_at(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(
        collection.count_bars_between(4.0, 1.0),
        collection.count_bars_between(1.0, 4.0)
    );
}

#[test]
fn empty_span_counts_zero() {
    let collection = collection_at(&[1.0, 2.0, 3.0]);
    assert_eq!(collection.count_bars_between(2.0, 2.0), 0);
}

#[test]
fn empty_collection_degrades_to_zero_and_none() {
    let collection = BarCollection::new();
    assert_eq!(collection.count_bars_between(0.0, 100.0), 0);
    assert!(collection.nearest_bar_x(5.0).is_none());
    assert!(collection.highest_bar().is_none());
    assert!(collection.lowest_bar().is_none());
    assert!(
        collection
            .closest_ohlc_scene_point(ScenePoint::new(0.0, 0.0))
            .is_none()
    );
}

#[test]
fn highest_and_lowest_bars_found() {
    let mut collection = BarCollection::new();
    collection.set_bars(vec![
        PriceBar::new(1.0, 10.0, 12.0, 9.0, 11.0).expect("bar"),
        PriceBar::new(2.0, 11.0, 15.0, 10.0, 14.0).expect("bar"),
        PriceBar::new(3.0, 14.0, 14.5, 8.0, 9.0).expect("bar"),
    ]);

    assert_eq!(collection.highest_bar().expect("highest").x, 2.0);
    assert_eq!(collection.lowest_bar().expect("lowest").x, 3.0);
}

#[test]
fn high_low_ties_keep_first_encountered_bar() {
    let mut collection = BarCollection::new();
    collection.set_bars(vec![
        PriceBar::new(1.0, 10.0, 15.0, 5.0, 12.0).expect("bar"),
        PriceBar::new(2.0, 10.0, 15.0, 5.0, 12.0).expect("bar"),
    ]);

    assert_eq!(collection.highest_bar().expect("highest").x, 1.0);
    assert_eq!(collection.lowest_bar().expect("lowest").x, 1.0);
}

#[test]
fn nearest_bar_x_picks_closest() {
    let collection = collection_at(&[1.0, 4.0, 9.0]);
    assert_eq!(collection.nearest_bar_x(5.0).expect("nearest"), 4.0);
    assert_eq!(collection.nearest_bar_x(8.0).expect("nearest"), 9.0);
}

#[test]
fn closest_ohlc_point_prefers_the_nearest_price_point() {
    // Query closer to the low than to open/high/close picks the low point.
    let mut collection = BarCollection::new();
    collection.set_bars(vec![
        PriceBar::new(3.0, 50.0, 60.0, 20.0, 55.0).expect("bar"),
    ]);

    let closest = collection
        .closest_ohlc_scene_point(ScenePoint::new(3.2, -22.0))
        .expect("closest point");
    assert_eq!(closest, ScenePoint::new(3.0, -20.0));
}

#[test]
fn closest_ohlc_point_breaks_ties_in_ohlc_order() {
    // Open and close are equal, so the query distance ties; open wins by
    // evaluation order.
    let mut collection = BarCollection::new();
    collection.set_bars(vec![
        PriceBar::new(1.0, 30.0, 40.0, 20.0, 30.0).expect("bar"),
    ]);

    let closest = collection
        .closest_ohlc_scene_point(ScenePoint::new(1.0, -30.0))
        .expect("closest point");
    assert_eq!(closest, ScenePoint::new(1.0, -30.0));
}

#[test]
fn set_bars_canonicalizes_order_and_duplicates() {
    let mut collection = BarCollection::new();
    collection.set_bars(vec![
        flat_bar(5.0, 103.0),
        flat_bar(1.0, 100.0),
        flat_bar(5.0, 104.0),
        flat_bar(3.0, 101.0),
    ]);

    let xs: Vec<f64> = collection.bars().iter().map(|bar| bar.x).collect();
    assert_eq!(xs, vec![1.0, 3.0, 5.0]);
    // Same-X duplicates keep the latest sample.
    assert_eq!(collection.bars()[2].close, 104.0);
}

#[test]
fn invalid_bars_are_rejected_at_construction() {
    assert!(PriceBar::new(1.0, 10.0, 9.0, 11.0, 10.0).is_err());
    assert!(PriceBar::new(1.0, 20.0, 15.0, 5.0, 10.0).is_err());
    assert!(PriceBar::new(f64::NAN, 10.0, 12.0, 9.0, 11.0).is_err());
}

#[test]
fn bar_helpers_compare_extremes() {
    let a = PriceBar::new(1.0, 10.0, 12.0, 9.0, 11.0).expect("bar");
    let b = PriceBar::new(2.0, 10.0, 14.0, 8.0, 11.0).expect("bar");

    assert!(b.has_higher_high_than(a));
    assert!(b.has_lower_low_than(a));
    assert_eq!(a.midpoint(), 10.5);
}
