//! Fuzz target: `parse_request` + `route`
//!
//! Drives arbitrary bytes through the request-line parser and the
//! dispatcher, asserting that neither panics and that every parsed query
//! respects its fixed capacity.
//!
//! cargo fuzz run fuzz_request_line

#![no_main]

use earm::web::dispatch::{Route, route};
use earm::web::request::{MAX_QUERY_PAIRS, parse_request};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(req) = parse_request(data) else {
        return;
    };

    if let Some(query) = &req.query {
        assert!(query.len() <= MAX_QUERY_PAIRS, "query exceeds capacity");
    }

    // A request without a query string must always render the page.
    if req.query.is_none() {
        assert_eq!(route(&req), Route::StatusPage);
    } else {
        assert_ne!(route(&req), Route::StatusPage);
    }
});
