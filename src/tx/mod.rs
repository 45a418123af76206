//! Transaction construction, signing and submission

mod gas;
mod outcome;
mod request;
mod sender;

pub use outcome::Outcome;
pub use sender::MintSubmitter;
