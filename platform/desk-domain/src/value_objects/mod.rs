pub mod agent_status;
pub mod control;
pub mod snapshot;
pub mod timestamp;
