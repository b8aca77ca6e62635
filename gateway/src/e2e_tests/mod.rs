//! End-to-end tests at the HTTP request/response level.
//!
//! Each test file covers one route or cross-cutting concern, driving the full
//! router (middleware included) with in-memory requests.

#![cfg(test)]


mod test_login;
mod test_routing;
