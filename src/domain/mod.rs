// Domain layer: swarm resource models and the cluster client port.

pub mod model;
pub mod ports;
