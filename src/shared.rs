pub mod errors;
pub mod logging;
pub mod slug;
pub mod timers;
