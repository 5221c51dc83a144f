//! Repository module - typed access to each persisted document.

mod analytics_repository;
mod content_repository;
mod profile_repository;
mod usage_repository;

pub use analytics_repository::AnalyticsRepository;
pub use content_repository::ContentRepository;
pub use profile_repository::ProfileRepository;
pub use usage_repository::UsageRepository;
