//! HTTP surface of the roster service.
//! Mounts the JSON API and HTML pages for every resource on top of `roster_core`.

pub mod config;
pub mod error;
pub mod form;
pub mod render;
pub mod resource;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::{handle_rejection, ApiError};
pub use resource::{Resource, RESOURCES, STUDENTS, TRAINEES};
pub use routes::routes;
pub use server::{run, StartupError};
pub use state::{AppState, SharedImageStore, SharedRepository};
