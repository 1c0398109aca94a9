pub mod pix_gateway_client;
pub mod pix_service;
pub mod request_normalizer;
pub mod response_normalizer;

pub use pix_gateway_client::{PixGateway, PixGatewayClient};
pub use pix_service::PixService;
pub use request_normalizer::RequestNormalizer;
pub use response_normalizer::{GatewayReply, ResponseNormalizer};
