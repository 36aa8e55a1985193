//! End-to-end tests against a live relay server
//!
//! Only compiled with the `ssr` feature.

mod relay_server_test;
