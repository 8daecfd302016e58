pub mod chrome;
pub mod generic;
pub mod gimp;
pub mod os;
pub mod thunderbird;
