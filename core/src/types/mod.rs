//! Closed value types shared across the tile core.

pub mod fragment;
pub mod ground;
pub mod icn;
pub mod object_type;
pub mod resource;
