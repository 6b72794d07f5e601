use clap::{ArgAction, Args, Parser, Subcommand};
use htcrystalball::core::version;
use htcrystalball::utils::STYLES;
use std::path::PathBuf;

const AFTER_HELP: &str = "\
Examples:
  htcrystalball 4 10G                    How many 4-core / 10 GiB jobs fit right now?
  htcrystalball 1 2G -j 200 -t 15m       How long do 200 such 15 minute jobs take?
  htcrystalball 8 32G -g 1 -m 2 -v       GPU jobs on at most two licensed nodes, with details
  htcrystalball -s job.sub               Read the job shape from a submit file

HTCondor treats storage sizes as binary, so 10G and 10GB both mean 10 GiB.";

#[derive(Debug, Parser)]
#[command(
    name = "htcrystalball",
    author,
    version = version(),
    styles = STYLES,
    about = "Preview how many jobs of a given shape fit on the HTCondor pool and how long they take to run.",
    after_help = AFTER_HELP,
    args_conflicts_with_subcommands = true
)]
pub struct HtCrystalBall {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub request: RequestArgs,

    /// Show input, node and per-node preview tables; repeat for more log output
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(long, help = "Path to the config file")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate tab-completion scripts for your shell
    #[command(arg_required_else_help = true)]
    Completion {
        /// The shell to generate the completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Args, Default)]
pub struct RequestArgs {
    /// CPU cores per job
    pub cpu: Option<u32>,

    /// RAM per job, e.g. 10G or 512M (GiB when no unit is given)
    pub ram: Option<String>,

    /// GPUs per job
    #[arg(short, long)]
    pub gpu: Option<u32>,

    /// Disk space per job, e.g. 20G (GiB when no unit is given)
    #[arg(short, long)]
    pub disk: Option<String>,

    /// Number of similar jobs to run
    #[arg(short, long)]
    pub jobs: Option<u32>,

    /// Duration of a single job, e.g. 15m, 2h, 1d, 30s or HH:MM:SS (minutes when no unit is given)
    #[arg(short, long)]
    pub time: Option<String>,

    /// Maximum number of nodes to run on at once, e.g. for node-locked licences
    #[arg(short, long)]
    pub max_nodes: Option<u32>,

    /// HTCondor submit file to read the job shape from; command-line values win
    #[arg(short, long, value_name = "FILE")]
    pub submit: Option<PathBuf>,

    /// Pool snapshot to match against (JSON or `condor_status -long` output)
    #[arg(short, long, value_name = "FILE")]
    pub pool: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        HtCrystalBall::command().debug_assert();
    }

    #[test]
    fn parses_positional_shape_and_flags() {
        let args = HtCrystalBall::try_parse_from([
            "htcrystalball",
            "4",
            "10G",
            "-g",
            "1",
            "-j",
            "20",
            "-t",
            "15m",
            "-m",
            "2",
            "-vv",
        ])
        .unwrap();

        assert!(args.command.is_none());
        assert_eq!(args.request.cpu, Some(4));
        assert_eq!(args.request.ram.as_deref(), Some("10G"));
        assert_eq!(args.request.gpu, Some(1));
        assert_eq!(args.request.jobs, Some(20));
        assert_eq!(args.request.time.as_deref(), Some("15m"));
        assert_eq!(args.request.max_nodes, Some(2));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn shape_may_come_from_a_submit_file() {
        let args = HtCrystalBall::try_parse_from(["htcrystalball", "-s", "job.sub"]).unwrap();
        assert_eq!(args.request.cpu, None);
        assert_eq!(args.request.submit, Some(PathBuf::from("job.sub")));
    }

    #[test]
    fn completion_subcommand() {
        let args = HtCrystalBall::try_parse_from(["htcrystalball", "completion", "bash"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::Completion {
                shell: clap_complete::Shell::Bash
            })
        ));
    }

    #[test]
    fn rejects_non_numeric_cpu() {
        assert!(HtCrystalBall::try_parse_from(["htcrystalball", "four", "10G"]).is_err());
    }
}
