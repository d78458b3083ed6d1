pub mod history;
pub mod persistence;


pub use history::*;
pub use persistence::*;
