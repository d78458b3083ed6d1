pub mod error;
pub mod forest;
pub mod manager;
pub mod parser;
pub mod scheduler;
pub mod types;


pub use error::*;
pub use forest::*;
pub use manager::*;
pub use parser::*;
pub use scheduler::*;
pub use types::*;
