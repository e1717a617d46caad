//! Background fetching from the event source.

pub mod worker;

pub use worker::fetch_worker_loop;
