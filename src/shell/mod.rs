// Composition root for the discharge board.
//
// Responsibilities
// - Read config from environment.
// - Wire upstream adapters into use case handlers.
// - Expose the HTTP routes and the live board refresher.

pub mod config;
pub mod http;
pub mod state;
pub mod workers;
