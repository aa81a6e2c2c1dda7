pub mod model;

// Re-export commonly used types/functions for the binaries
pub use model::{label_list, load_words, render_words, LabelKV, Report};
