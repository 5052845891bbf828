pub mod buffer;
pub mod practice;
pub mod result;
pub mod scroll;
pub mod stats;
pub mod typing;
