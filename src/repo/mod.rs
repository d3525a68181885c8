pub mod filter;
pub mod sqlite;
