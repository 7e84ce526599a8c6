pub mod handlers;
pub mod middlewares;
pub mod notifiers;
pub mod routes;
