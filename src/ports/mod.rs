//! Port traits: the boundary between the simulation and its collaborators.

pub mod config_port;
pub mod data_port;
pub mod audit_port;
pub mod report_port;
