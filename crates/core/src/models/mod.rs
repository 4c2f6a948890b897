pub mod alert;
pub mod analytics;
pub mod chart;
pub mod facet;
pub mod instrument;
pub mod settings;
pub mod summary;
pub mod trade;
