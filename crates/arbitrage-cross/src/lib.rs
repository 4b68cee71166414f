//! Cross-venue box arbitrage for 15-minute binary BTC-direction markets.
//!
//! Watches a CLOB-style signed-header venue (Kalshi) and an onchain L2
//! prediction market (Polymarket) for the same 15-minute interval, and
//! executes a box — buying YES on one venue and NO on the other — whenever
//! the combined cost clears the guaranteed $1.00 payout by enough margin to
//! absorb fees and slippage.
//!
//! # Modules
//!
//! - [`types`]: interval-keyed data model shared by every other module
//! - [`fees`]: per-venue fee formulas and the combined box fee buffer
//! - [`scanner`]: pure cost comparison across both box orientations
//! - [`guards`]: the fixed pre-trade guard chain
//! - [`execution`]: the two-phase commit execution core and unwind ladder
//! - [`execution_state`]: process-wide busy lock, cooldown, P&L, kill switch
//! - [`position`]: authoritative local position and cost-basis tracking
//! - [`reconciler`]: periodic divergence detection against venue-reported positions
//! - [`settlement`]: interval-close capture and delayed resolution confirmation
//! - [`mapping`]: bounded interval-to-market-id store and ticker/slug construction
//! - [`coordinator`]: quote cache, active mapping, and rollover orchestration

pub mod coordinator;
pub mod execution;
pub mod execution_state;
pub mod fees;
pub mod guards;
pub mod mapping;
pub mod position;
pub mod reconciler;
pub mod scanner;
pub mod settlement;
pub mod types;

pub use coordinator::{Coordinator, CoordinatorEvent, QuoteCache, RolloverActions};
pub use execution::{ExecutionCore, ExecutionError, ExecutionResult, VenueClients};
pub use execution_state::{ExecutionState, KillSwitchReason};
pub use fees::{box_fee_buffer, clob_leg_fee, leg_fee, onchain_leg_fee};
pub use guards::{evaluate as evaluate_guards, GuardContext, GuardOutcome};
pub use mapping::{
    interval_observes_dst, kalshi_mapping_for_interval, polymarket_mapping_for_interval,
    MappingStore,
};
pub use position::PositionTracker;
pub use reconciler::{PositionReconciler, RemotePosition, VenuePositionSource};
pub use scanner::scan;
pub use settlement::{ResolvedSide, SettlementOutcome, SettlementSource, SettlementTracker};
pub use types::{ExecutionRecord, ExecutionStatus, IntervalMapping, Opportunity, OpportunityLeg};
