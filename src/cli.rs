pub mod doctor;
pub mod harness;
pub mod resolve;
pub mod search;
pub mod setup;

pub use harness::Harness;
pub use search::SearchArgs;
