use annot_rs::artifacts::{BarCountArtifact, ModalScaleArtifact, MusicalRatio};
use annot_rs::core::{
    BarCollection, PriceBar, PriceBarIndex, SceneMapper, ScenePoint, price_to_scene_y,
    scene_y_to_price,
};
use proptest::prelude::*;

fn collection_from_xs(xs: &[f64]) -> BarCollection {
    let mut collection = BarCollection::new();
    collection.set_bars(
        xs.iter()
            .map(|&x| PriceBar::new(x, 100.0, 101.0, 99.0, 100.5).expect("valid bar"))
            .collect(),
    );
    collection
}

proptest! {
    #[test]
    fn price_round_trip_is_exact(price in -1_000_000.0f64..1_000_000.0) {
        let y = price_to_scene_y(price);
        prop_assert_eq!(scene_y_to_price(y), price);
    }

    #[test]
    fn scene_x_round_trip_holds_to_day_precision(days in -20_000i32..20_000) {
        let mapper = SceneMapper::utc();
        let x = f64::from(days);

        let time = mapper.scene_x_to_timestamp(x).expect("within range");
        let recovered = mapper.timestamp_to_scene_x(time);
        prop_assert!((recovered - x).abs() < 1e-9);
    }

    #[test]
    fn bar_count_is_direction_independent(
        xs in proptest::collection::vec(-500.0f64..500.0, 0..40),
        a in -500.0f64..500.0,
        b in -500.0f64..500.0
    ) {
        let collection = collection_from_xs(&xs);
        prop_assert_eq!(
            collection.count_bars_between(a, b),
            collection.count_bars_between(b, a)
        );
    }

    #[test]
    fn normalization_is_idempotent(
        start_x in -500.0f64..500.0,
        end_x in -500.0f64..500.0,
        xs in proptest::collection::vec(-500.0f64..500.0, 0..20)
    ) {
        let collection = collection_from_xs(&xs);
        let mut artifact = BarCountArtifact::new("bc", ScenePoint::new(start_x, -100.0));
        artifact.set_end_point(ScenePoint::new(end_x, -100.0));

        artifact.normalize_start_and_end(&collection);
        let once = artifact.clone();
        artifact.normalize_start_and_end(&collection);
        prop_assert_eq!(artifact, once);
    }

    #[test]
    fn normalized_spans_count_like_reversed_input(
        start_x in -500.0f64..500.0,
        end_x in -500.0f64..500.0,
        xs in proptest::collection::vec(-500.0f64..500.0, 0..20)
    ) {
        let collection = collection_from_xs(&xs);

        let mut forward = BarCountArtifact::new("f", ScenePoint::new(start_x, -100.0));
        forward.set_end_point(ScenePoint::new(end_x, -100.0));
        forward.normalize_start_and_end(&collection);

        let mut backward = BarCountArtifact::new("b", ScenePoint::new(end_x, -100.0));
        backward.set_end_point(ScenePoint::new(start_x, -100.0));
        backward.normalize_start_and_end(&collection);

        prop_assert_eq!(forward.bar_count(), backward.bar_count());
        prop_assert_eq!(forward.start_point().x, backward.start_point().x);
        prop_assert_eq!(forward.end_point().x, backward.end_point().x);
    }

    #[test]
    fn rotation_inverse_law(mut flags in proptest::collection::vec(any::<bool>(), 2..12)) {
        // Rotation always leaves an enabled ratio in front, so the law is
        // checked from that steady state with at least two enabled entries.
        flags[0] = true;
        if !flags[1..].iter().any(|&enabled| enabled) {
            flags[1] = true;
        }

        let ratios: Vec<MusicalRatio> = flags
            .iter()
            .enumerate()
            .map(|(i, &enabled)| {
                let mut ratio = MusicalRatio::from_float(1.0 + i as f64 * 0.125);
                ratio.enabled = enabled;
                ratio
            })
            .collect();
        let mut scale =
            ModalScaleArtifact::with_ratios("ms", ScenePoint::new(0.0, 0.0), ratios.clone());
        scale.set_end_point(ScenePoint::new(10.0, -5.0));

        scale.rotate_up();
        scale.rotate_down();
        prop_assert_eq!(scale.musical_ratios(), ratios.as_slice());

        scale.rotate_down();
        scale.rotate_up();
        prop_assert_eq!(scale.musical_ratios(), ratios.as_slice());
    }

    #[test]
    fn rotation_preserves_the_ratio_set(
        flags in proptest::collection::vec(any::<bool>(), 1..12),
        downs in 0usize..6
    ) {
        let ratios: Vec<MusicalRatio> = flags
            .iter()
            .enumerate()
            .map(|(i, &enabled)| {
                let mut ratio = MusicalRatio::from_float(1.0 + i as f64 * 0.125);
                ratio.enabled = enabled;
                ratio
            })
            .collect();
        let mut scale =
            ModalScaleArtifact::with_ratios("ms", ScenePoint::new(0.0, 0.0), ratios.clone());

        for _ in 0..downs {
            scale.rotate_down();
        }

        let mut rotated: Vec<f64> = scale.musical_ratios().iter().map(|r| r.ratio).collect();
        let mut original: Vec<f64> = ratios.iter().map(|r| r.ratio).collect();
        rotated.sort_by(f64::total_cmp);
        original.sort_by(f64::total_cmp);
        prop_assert_eq!(rotated, original);
    }
}
