#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod app;
pub mod capabilities;
pub mod cli;
pub mod config;
pub mod error;
pub mod helper;
pub mod identity;
pub mod ipc;
pub mod observability;
pub mod paths;
pub mod requester;
pub mod version;

pub use config::Config;
pub use error::{ErrorKind, Result, SzError};
