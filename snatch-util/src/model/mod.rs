mod contest;
mod problem;

pub use contest::*;
pub use problem::*;
