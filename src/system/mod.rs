pub mod collector;
pub mod cpu;
pub mod fs;
pub mod mock;
pub mod parser;
pub mod platform;
pub mod process;
pub mod reader;
pub mod snapshot;
