pub mod models;
pub mod replay;
pub mod writer;

pub use replay::replay;
pub use writer::JournalWriter;
