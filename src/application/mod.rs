// Application layer - Feed use cases and the gateway seam
pub mod feed_controller;
pub mod feed_service;
pub mod launch_gateway;
