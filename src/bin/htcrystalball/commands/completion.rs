use crate::cli::HtCrystalBall;
use anyhow::Result;
use clap::CommandFactory;
use std::io::Write;

pub fn handle_completion(shell: clap_complete::Shell) -> Result<()> {
    let mut cmd = HtCrystalBall::command();
    let mut buf = Vec::<u8>::new();
    clap_complete::generate(shell, &mut cmd, env!("CARGO_PKG_NAME"), &mut buf);

    match std::io::stdout().write_all(&buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(e) => Err(e.into()),
    }
}
