mod common;

use common::sample_tree;
use proptest::prelude::*;
use techforge_core::codec;
use techforge_core::grid::{Cell, Grid};
use techforge_core::rle;

const PLACEMENTS: &[(&str, &str)] = &[
    ("shield", "Cb"),
    ("shield", "Ca"),
    ("shield", "DS"),
    ("hyper", "HD"),
    ("hyper", "Xa"),
    ("launch", "LT"),
];

prop_compose! {
    fn arb_cell()(
        slot in proptest::option::of(0..PLACEMENTS.len()),
        supercharged in any::<bool>(),
        active in any::<bool>()
    ) -> Cell {
        match slot {
            Some(i) => {
                let (tech, module) = PLACEMENTS[i];
                let tree = sample_tree();
                Cell::placed(tech, tree.module(tech, module).unwrap(), supercharged, active)
            }
            None => Cell::empty(supercharged, active),
        }
    }
}

// Widths up to 10 keep the `<width><height>` split unambiguous.
prop_compose! {
    fn arb_grid()(width in 1usize..=10, height in 1usize..=12)(
        cells in proptest::collection::vec(arb_cell(), width * height),
        width in Just(width),
        height in Just(height)
    ) -> Grid {
        Grid {
            cells: cells.chunks(width).map(<[Cell]>::to_vec).collect(),
            width,
            height,
        }
    }
}

proptest! {
    #[test]
    fn prop_rle_round_trip(s in "[A-Za-z.]{0,200}") {
        prop_assert_eq!(rle::decompress(&rle::compress(&s)), s);
    }

    #[test]
    fn prop_rle_single_run_is_char_and_count(c in "[A-Z]", n in 2usize..500) {
        let s = c.repeat(n);
        prop_assert_eq!(rle::compress(&s), format!("{c}{n}"));
    }

    #[test]
    fn prop_grid_round_trip(grid in arb_grid()) {
        let serialized = codec::serialize(&grid).unwrap();
        let encoded = codec::parse(&serialized).unwrap();
        let (decoded, _) = codec::resolve(&encoded, &sample_tree());
        prop_assert_eq!(decoded, grid);
    }

    #[test]
    fn prop_parse_is_total(s in "\\PC{0,64}") {
        let _ = codec::parse(&s);
    }

    #[test]
    fn prop_parse_is_total_on_near_misses(
        s in "[0-9]{1,4}\\|[TF0-9]{0,8}\\|[TF0-9]{0,8}\\|[A-C.0-9]{0,16}\\|(shield:[A-C])?\\|(Cb:[A-C])?"
    ) {
        let _ = codec::parse(&s);
    }
}
