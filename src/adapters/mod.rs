// Adapters layer: concrete cluster clients.

pub mod docker;
