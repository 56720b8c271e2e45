pub mod analytics;

pub mod dashboards;

pub mod progress;

pub use analytics::configure_analytics_routes;
pub use dashboards::configure_dashboard_routes;
pub use progress::configure_progress_routes;
