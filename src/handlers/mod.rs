pub mod echo;
pub mod health;

pub use echo::echo;
pub use health::{health_check, not_found, status};
