pub mod bezier;
pub mod frame;
pub mod patch;
pub mod vector;
