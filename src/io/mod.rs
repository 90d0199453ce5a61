pub mod cli;
pub mod config;
pub mod logger;
pub mod output;
pub mod packet_buffer;
pub mod validation;
