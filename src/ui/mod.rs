pub mod layout;
pub mod panels;
