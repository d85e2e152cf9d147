mod alias;
mod health;

pub use alias::{redirect_handler, shorten_handler, usage_handler};
pub use health::health_handler;
