pub mod input_loader;

pub use input_loader::{discover_inputs, is_presentation_file};
