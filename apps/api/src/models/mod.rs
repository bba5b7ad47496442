pub mod candidate;
pub mod cv;
pub mod role;
