// Domain layer: data model, polygon geometry and collaborator ports.

pub mod geometry;
pub mod model;
pub mod ports;
