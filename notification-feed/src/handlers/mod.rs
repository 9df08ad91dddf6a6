pub mod health;
pub mod metrics;
pub mod notifications;

pub use health::{health_check, readiness_check};
pub use self::metrics::metrics_endpoint;
pub use notifications::get_notifications;
