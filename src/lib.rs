pub mod archive;
pub mod download;
pub mod http;
pub mod install;
pub mod platform;
pub mod release;
pub mod runtime;
pub mod stage;
