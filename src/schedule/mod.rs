pub mod boundary;
pub mod day;
pub mod faced;
pub mod pairing;
pub mod phase;
pub mod tiebreak;

pub use boundary::{
    activation_reasons, schedule_boundaries, ActivationReason, BoundaryActivation,
    BoundaryContext, BoundaryTag,
};
pub use day::{schedule_day, DaySchedule};
pub use faced::FacedSet;
pub use pairing::{
    greedy_pass, pair_leftovers, phase_order, schedule_division, ConstraintSet, DivisionPairing,
    Pairing, PairingStage, PassResult,
};
pub use phase::{Entrant, Phase};
pub use tiebreak::{HashTieBreak, RandomTieBreak, TieBreak};
