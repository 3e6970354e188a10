// hostel_app/src/services/mod.rs

pub mod auth_service;
pub mod payment_gateway;
pub mod paymongo;

pub use payment_gateway::PaymentGateway;
pub use paymongo::PayMongoGateway;
