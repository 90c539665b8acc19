//! Repositories: stateless query modules over the connection pool.
//!
//! Each repository is a unit struct with associated async functions that
//! take `&PgPool` and return `Result<_, sqlx::Error>`. Error mapping to
//! HTTP status codes happens at the API layer.

pub mod dashboard_repo;
pub mod execution_repo;
pub mod instance_repo;

pub use dashboard_repo::DashboardRepo;
pub use execution_repo::ExecutionRepo;
pub use instance_repo::InstanceRepo;
