pub mod codec;
pub mod destination;
pub mod formatter;
pub mod logger;
pub mod setup;
