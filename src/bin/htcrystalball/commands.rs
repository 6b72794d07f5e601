use crate::cli::{Commands, HtCrystalBall};
use anyhow::Result;

pub mod completion;
pub mod estimate;

pub fn handle_commands(args: HtCrystalBall) -> Result<()> {
    match args.command {
        Some(Commands::Completion { shell }) => completion::handle_completion(shell),
        None => estimate::handle_estimate(&args),
    }
}
