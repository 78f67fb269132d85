// Library crate: the contour engine, the modal dispatch layer and the headless
// harness used by integration tests and the scripting CLI.

pub mod command;
pub mod cut_loop;
pub mod cut_path;
pub mod error;
pub mod fixtures;
pub mod geometry;
pub mod harness;
pub mod loft;
pub mod modal;
pub mod state;
pub mod surface;
pub mod validation;
pub mod view;
