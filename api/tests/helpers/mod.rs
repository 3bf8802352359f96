pub mod app;
pub mod ws;

pub use app::{TestApp, make_test_app};
pub use ws::{connect_ws, next_json, spawn_server};
