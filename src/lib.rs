//! Headless simulation of a single-screen gallery shooter.
//!
//! The host owns a [`entities::Stage`], feeds it held-key state once per frame
//! through [`compute::tick`] and draws whatever the stage now contains.
//! Rendering, audio and input polling stay outside this crate.

pub mod compute;
pub mod entities;
pub mod pool;
pub mod waves;
