// Oracle consensus: index assignment, status requests, response tallying
// and the async oracle swarm that answers requests in-process.

pub mod indices;
pub mod oracle;
pub mod status;
pub mod swarm;

pub use indices::IndexGenerator;
pub use oracle::{
    FlightStatusRequest, Oracle, OracleConsensusEngine, OracleResponse, RequestKey, RequestState,
    ResponseOutcome, Settlement,
};
pub use status::FlightStatus;
pub use swarm::{
    await_finalization, FixedReporter, OracleSwarm, RandomReporter, ReportMode, StatusReporter,
    SwarmOracle, WorkerStats,
};
