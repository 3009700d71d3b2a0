//! Acupuncture point database: XML persistence, selection/filter/view
//! state, and change notification.

pub mod change;
pub mod database;
pub mod editor;
pub mod image_loader;
pub mod options;
pub mod status;
mod xml;

pub use change::{Change, Observer, ObserverId, Reason};
pub use database::{PointDatabase, SelectionMode};
pub use editor::{ImageView, PointEditor};
pub use image_loader::ImageLoader;
pub use options::LoadOptions;
pub use status::{StatusReporter, TracingStatus};
pub use xml::FORMAT_VERSION;
