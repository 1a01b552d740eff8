pub mod format;
pub mod markup;
pub mod view;
