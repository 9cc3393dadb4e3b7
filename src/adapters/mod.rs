// Adapters layer: concrete implementations for external collaborators (CSV
// input, remote asset-management API).

pub mod csv_source;
pub mod http;
