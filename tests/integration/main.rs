//! In-process integration tests driving the full router

mod api_tests;
mod form_tests;
