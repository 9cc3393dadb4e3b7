// Domain layer: value objects and ports (interfaces). No transport or file
// format knowledge lives here.

pub mod model;
pub mod ports;
