use crate::commands::{run_rank, run_score, run_train, RankArgs, ScoreArgs, TrainArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use job_portal::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Job Portal",
    about = "Run the job portal service or score and rank candidates from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Train the priority model from the scored candidate history
    Train(TrainArgs),
    /// Print candidates in review order
    Rank(RankArgs),
    /// Explain the priority score of a single candidate
    Score(ScoreArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Train(args) => run_train(args),
        Command::Rank(args) => run_rank(args),
        Command::Score(args) => run_score(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use job_portal::workflows::candidates::ApplicationStatus;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["job-portal"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn rank_accepts_filters() {
        let cli = Cli::try_parse_from([
            "job-portal",
            "rank",
            "--limit",
            "5",
            "--status",
            "Pending",
            "--job-role",
            "Data Scientist",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Rank(args)) => {
                assert_eq!(args.limit, 5);
                assert_eq!(args.status, Some(ApplicationStatus::Pending));
                assert_eq!(args.job_role.as_deref(), Some("Data Scientist"));
            }
            other => panic!("expected rank command, got {other:?}"),
        }
    }

    #[test]
    fn score_requires_a_username() {
        assert!(Cli::try_parse_from(["job-portal", "score"]).is_err());
        let cli = Cli::try_parse_from(["job-portal", "score", "--username", "ada"])
            .expect("parses");
        assert!(matches!(cli.command, Some(Command::Score(args)) if args.username == "ada"));
    }
}
