use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "thicket",
    about = "Threaded comments with cascading deletes and votes",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the snapshots and thicket.toml
    #[arg(long, global = true, default_value = ".thicket")]
    pub data_dir: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Post a top-level comment
    Post(PostArgs),
    /// Reply to a comment
    Reply(ReplyArgs),
    /// Replace a comment's text
    Edit(EditArgs),
    /// Delete a comment and all of its replies
    Delete(DeleteArgs),
    /// Collapse or expand a comment's replies
    Collapse(TargetArgs),
    /// Like a comment, or retract your like
    Like(TargetArgs),
    /// Dislike a comment, or retract your dislike
    Dislike(TargetArgs),
    /// Show the comment tree
    Show(ShowArgs),
    /// Show comment and vote counts
    Stats(StatsArgs),
    /// Delete every comment
    Clear(ClearArgs),
    /// Show the effective configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct PostArgs {
    pub text: String,
}

#[derive(Args)]
pub struct ReplyArgs {
    /// Parent comment id or unique prefix
    pub parent: String,
    pub text: String,
}

#[derive(Args)]
pub struct EditArgs {
    pub id: String,
    pub text: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub id: String,
    /// Confirm the deletion
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct TargetArgs {
    pub id: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Only show this comment's thread
    pub id: Option<String>,
    /// Include replies under collapsed comments
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Args)]
pub struct StatsArgs {}

#[derive(Args)]
pub struct ClearArgs {
    /// Confirm clearing every comment
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ConfigArgs {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_post() {
        let cli = Cli::try_parse_from(["thicket", "post", "hello"]).unwrap();
        if let Command::Post(args) = cli.command {
            assert_eq!(args.text, "hello");
        } else { panic!("wrong command"); }
        assert_eq!(cli.data_dir, PathBuf::from(".thicket"));
    }

    #[test]
    fn parse_reply() {
        let cli = Cli::try_parse_from(["thicket", "reply", "0190abcd", "hi there"]).unwrap();
        if let Command::Reply(args) = cli.command {
            assert_eq!(args.parent, "0190abcd");
            assert_eq!(args.text, "hi there");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_delete_requires_flag_to_confirm() {
        let cli = Cli::try_parse_from(["thicket", "delete", "abc"]).unwrap();
        if let Command::Delete(args) = cli.command {
            assert!(!args.yes);
        } else { panic!("wrong command"); }

        let cli = Cli::try_parse_from(["thicket", "delete", "abc", "--yes"]).unwrap();
        if let Command::Delete(args) = cli.command {
            assert!(args.yes);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_show_all() {
        let cli = Cli::try_parse_from(["thicket", "show", "--all"]).unwrap();
        if let Command::Show(args) = cli.command {
            assert!(args.all);
            assert!(args.id.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_like_and_dislike() {
        let cli = Cli::try_parse_from(["thicket", "like", "abc"]).unwrap();
        assert!(matches!(cli.command, Command::Like(_)));
        let cli = Cli::try_parse_from(["thicket", "dislike", "abc"]).unwrap();
        assert!(matches!(cli.command, Command::Dislike(_)));
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "thicket", "--verbose", "--data-dir", "/tmp/t", "--format", "json", "stats",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/t"));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn missing_text_is_rejected() {
        assert!(Cli::try_parse_from(["thicket", "post"]).is_err());
    }
}
