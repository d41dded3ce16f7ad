//! Caption pipeline: per-window processing, per-session workers and the
//! service that routes wire messages to them.

pub mod runner;
pub mod service;
pub mod worker;

pub use runner::{CaptionPipeline, SessionTrack, WindowCaption};
pub use service::CaptionService;
pub use worker::{SessionWorker, WorkerCommand};
