//! NOVA engine crate.
//!
//! Frame scheduling, pointer ray-cast dispatch and post-processing for
//! interactive 3D scenes. Drawing is delegated to a [`gfx::Renderer`]
//! supplied by the embedding application.

pub mod app;
pub mod coords;
pub mod error;
pub mod events;
pub mod gfx;
pub mod input;
pub mod logging;
pub mod loops;
pub mod post;
pub mod signal;
pub mod time;
pub mod transition;
pub mod window;
pub mod world;

#[cfg(test)]
mod testing;
