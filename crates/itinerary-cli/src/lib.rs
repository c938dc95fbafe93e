//! Itinerary CLI - HTTP client and command line tool for the itinerary server.

pub mod client;

pub use client::{ClearOption, ItineraryClient, Outcome, View};
