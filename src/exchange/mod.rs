pub mod apply;
pub mod resolver;
pub mod rules;

pub use apply::{apply_exchanges, exchange_flags, ExchangeFlags};
pub use resolver::{
    equalize_slots, resolve_boundary, resolve_exchanges, CandidateScore, ExchangeOutcome,
    ExchangeReason,
};
pub use rules::{rule_for, ExchangeRule, ProjectionRule, SekitoriRule, Standing, Verdict};
