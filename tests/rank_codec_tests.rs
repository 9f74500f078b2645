use basho::league::Division;
use basho::rank::{decode, encode, Rank, RankBand, RankLayout, Side};

fn layouts() -> Vec<RankLayout> {
    let mut layouts: Vec<RankLayout> = Division::ALL
        .iter()
        .flat_map(|division| {
            [1usize, 5, 9, 28, 42, 120]
                .into_iter()
                .map(move |headcount| RankLayout::for_division(*division, headcount))
        })
        .collect();
    layouts.push(RankLayout::new(vec![
        RankBand::new("Top", 3),
        RankBand::new("Empty", 0),
        RankBand::new("Rest", 7),
    ]));
    layouts
}

#[test]
fn every_rank_score_round_trips() {
    for layout in layouts() {
        for score in 1..=layout.total_capacity() {
            let rank = decode(score, &layout);
            assert_eq!(encode(&rank, &layout), score, "{rank} in {layout:?}");
        }
    }
}

#[test]
fn every_valid_rank_round_trips() {
    for layout in layouts() {
        for band in layout.bands() {
            for offset in 0..band.capacity {
                let rank = Rank {
                    band: band.name.clone(),
                    number: offset / 2 + 1,
                    side: if offset % 2 == 0 { Side::East } else { Side::West },
                };
                assert_eq!(decode(encode(&rank, &layout), &layout), rank);
            }
        }
    }
}

#[test]
fn odd_band_capacity_ends_on_east() {
    let layout = RankLayout::new(vec![RankBand::new("Top", 3), RankBand::new("Rest", 4)]);
    let last_top = layout.decode(3);
    assert_eq!(last_top.band, "Top");
    assert_eq!(last_top.number, 2);
    assert_eq!(last_top.side, Side::East);
    assert_eq!(layout.decode(4).to_string(), "Rest 1 East");
}

#[test]
fn unknown_band_encodes_to_last_slot() {
    let layout = RankLayout::for_division(Division::Juryo, 28);
    let stray = Rank {
        band: "Yokozuna".to_string(),
        number: 1,
        side: Side::East,
    };
    assert_eq!(encode(&stray, &layout), 28);
}
