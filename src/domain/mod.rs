pub mod admin;
pub mod member;
pub mod plan;

pub use admin::*;
pub use member::*;
pub use plan::*;
