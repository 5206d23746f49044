pub mod ids;
pub mod words;
