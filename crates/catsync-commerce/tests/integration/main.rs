//! Integration tests for catsync-commerce
//!
//! Uses wiremock to simulate the commerce admin API.

mod common;

mod test_catalog;
mod test_inventory;
