// Domain layer: models, ports and the static workflow catalogue.

pub mod model;
pub mod ports;
pub mod workflow;
