//! Integration tests
//!
//! Exercise the client against the in-memory connector and a mocked
//! handshake endpoint.

mod app_test;
mod relay_client_test;
mod session_test;
