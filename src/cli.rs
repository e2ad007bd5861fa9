use anstyle::{AnsiColor, Color, Style};
use clap::Parser;
use clap::builder::Styles;
use clap_complete::Shell;

const fn colored(color: AnsiColor) -> Style {
    Style::new().fg_color(Some(Color::Ansi(color)))
}

pub const fn get_styles() -> Styles {
    Styles::styled()
        .usage(colored(AnsiColor::Yellow).bold().underline())
        .header(colored(AnsiColor::Yellow).bold().underline())
        .literal(colored(AnsiColor::Green))
        .invalid(colored(AnsiColor::Red).bold())
        .error(colored(AnsiColor::Red).bold())
        .valid(colored(AnsiColor::Green).bold().underline())
        .placeholder(colored(AnsiColor::White))
}

pub trait Process {
    async fn process(self) -> anyhow::Result<i32>;
}

/// Cleanup lingering S3 buckets created during development.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Parser)]
#[clap(version, styles=get_styles())]
pub struct Args {
    #[arg(long = "generate", value_enum)]
    pub generator: Option<Shell>,

    #[clap(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Parser)]
pub struct CleanupOptions {}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Parser)]
pub enum Commands {
    /// Select a bucket, empty every version in it and delete it
    Cleanup(CleanupOptions),
}

impl Process for Commands {
    async fn process(self) -> anyhow::Result<i32> {
        match self {
            Self::Cleanup(opts) => opts.process().await,
        }
    }
}
