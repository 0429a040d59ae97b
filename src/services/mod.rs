pub mod classifier;
pub mod conversation;
pub mod prompt;
pub mod session;
