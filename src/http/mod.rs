pub mod api_types;
pub mod routes;

pub use routes::build_router;
