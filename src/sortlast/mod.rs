pub mod app;
pub mod bounds;
pub mod camera;
pub mod comm;
pub mod composite;
pub mod distribute;
pub mod image;
pub mod loader;
pub mod mesh;
pub mod options;
pub mod paint;
pub mod telemetry;

pub use app::{App, Launch};
