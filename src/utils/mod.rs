pub mod log_bridge;
