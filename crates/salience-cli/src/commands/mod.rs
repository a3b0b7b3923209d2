pub mod config;
pub mod replay;
pub mod score;

pub use config::ConfigCommand;
pub use replay::ReplayCommand;
pub use score::ScoreCommand;
