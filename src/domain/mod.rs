// Domain layer: records, outcomes and the ports the core drives.

pub mod model;
pub mod ports;
