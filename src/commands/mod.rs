pub mod ls;
pub mod lsof;
pub mod sh;
