// Adapters layer: concrete implementations for external systems (email provider,
// sequence generation backend and its product catalog, CSV input).

pub mod brevo;
pub mod csv_recipients;
pub mod generator;
pub mod products;
