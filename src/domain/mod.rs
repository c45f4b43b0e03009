// Domain layer: table and aggregate models plus the ports the pipeline runs against.

pub mod model;
pub mod ports;
