pub mod config;
pub mod constants;
pub mod extractors;
pub mod inference;
pub mod logging;
pub mod middleware;
pub mod model;
pub mod response;
pub mod routes;
pub mod state;
