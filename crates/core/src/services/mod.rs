pub mod alert_service;
pub mod analytics_orchestrator;
pub mod chart_service;
pub mod mutation_service;
