//! Integration tests with mock HTTP server

pub mod convert;
pub mod mock_server;
pub mod raw_server;
pub mod voices;
