pub mod state;
pub mod workflows;
