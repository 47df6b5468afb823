pub mod canon;
pub mod cuts;
pub mod delta;
