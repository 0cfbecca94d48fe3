pub mod classify_frame;
pub mod core;
pub mod main;
pub mod presenter;
pub mod render;
pub mod run_effect;
mod session;

#[cfg(test)]
mod tests;
