//! Service-specific tests
//!
//! Each service has its own test file; HTTP-backed services run against a
//! local `wiremock` server.

mod fly_saboteur;
