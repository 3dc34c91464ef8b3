//! prebuilt - content-digest build cache
//!
//! Decides whether a build of an application's current inputs already
//! exists by comparing their total input digest against recorded builds.

pub mod app;
pub mod cli;
pub mod config;
pub mod digest;
pub mod error;
pub mod input;
pub mod status;
pub mod storage;

pub use app::App;
pub use error::{PrebuiltError, PrebuiltResult};
pub use input::InputFile;
pub use status::{build_status, BuildDecision, BuildStatus};
pub use storage::{Build, Storer};
