//! Integration tests for catsync-sync
//!
//! Uses wiremock to serve image downloads, cloud-drive responses and the
//! commerce admin API.

mod common;

mod test_engine;
mod test_images;
