//! Track values and discovery of playable files from command-line paths.

mod model;
mod scan;

pub use model::Track;
pub use scan::collect_audio_files;
