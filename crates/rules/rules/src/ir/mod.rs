pub mod gate;
pub mod rule;
pub mod skeleton;
