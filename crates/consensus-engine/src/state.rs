// consensus-engine/src/state.rs

use serde::Serialize;

/// The engine's coarse phase, exposed for observability and tests. The
/// real transition logic lives in `engine.rs`; this enum only ever moves
/// forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnginePhase {
    /// S0: waiting for the subnet to reach `Active` state.
    Activating,
    /// S1: subnet is active; waiting for this node to reach Idle-or-higher
    /// classification.
    AwaitingEligibility,
    /// S2: steady-state per-epoch validator/attestor loop.
    Running,
    /// S3: terminal. The engine does not restart itself.
    Terminated,
}

/// Why the engine reached S3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TerminationReason {
    /// Cooperative shutdown was requested.
    Shutdown,
    /// `get_subnet_info` returned `None` more than the retry budget allows
    /// during activation.
    SubnetNotFound,
}
