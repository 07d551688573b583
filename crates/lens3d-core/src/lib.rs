pub mod bounds;
pub mod camera;
pub mod config;
pub mod error;
pub mod geom;
pub mod model;
pub mod pick;
pub mod planes;
pub mod reorder;
pub mod report;
pub mod sketch;

pub use error::{CoreError, Result};
