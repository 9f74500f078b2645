pub mod codec;

pub use codec::{decode, encode, Rank, RankBand, RankLayout, Side, SANYAKU_BANDS, UNRANKED_BAND};
