pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod workflow;

pub use routes::create_router;
