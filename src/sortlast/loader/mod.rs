mod procedural;
mod stl;

pub use procedural::make_box;
pub use stl::read_stl;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}
