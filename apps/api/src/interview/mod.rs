// Interview sessions: question selection, persistence, reports and the HTTP handlers.

pub mod handlers;
pub mod questions;
pub mod report;
pub mod store;
