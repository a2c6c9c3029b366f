pub mod colors;
pub mod terminal;
