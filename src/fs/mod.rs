pub mod meta;
pub mod preserve;
pub mod restore;
