use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use touchdiff::{DiffView, Style, TouchdiffError, Viewport, server, view};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "touchdiff", version)]
#[command(about = "Collapsible, scrollable diff tree for touch screens")]
struct Cli {
    /// Style file (default: ./.touchdiff.toml, then ~/.touchdiff.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ViewportArgs {
    /// Viewport width in logical pixels
    #[arg(long, default_value_t = 480.0)]
    width: f32,
    /// Viewport height in logical pixels
    #[arg(long, default_value_t = 800.0)]
    height: f32,
}

impl From<&ViewportArgs> for Viewport {
    fn from(args: &ViewportArgs) -> Self {
        Viewport::new(args.width, args.height)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out a diff and print the nodes visible in the viewport
    Show {
        /// Diff file to read (default: stdin)
        file: Option<PathBuf>,
        #[command(flatten)]
        viewport: ViewportArgs,
        /// Drag delta to apply before printing
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        scroll: f32,
        /// Collapse every file and hunk before printing
        #[arg(long)]
        collapse_all: bool,
    },
    /// Receive diffs over a Unix socket, one per connection
    Serve {
        /// Socket path to listen on
        #[arg(long, value_name = "PATH")]
        socket: PathBuf,
        #[command(flatten)]
        viewport: ViewportArgs,
    },
    /// Print shell completions
    Completions { shell: Shell },
    /// Print the man page
    Man,
}

fn main() -> Result<(), TouchdiffError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("touchdiff=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            file,
            viewport,
            scroll,
            collapse_all,
        } => {
            let input = read_input(file.as_deref())?;
            let mut view = DiffView::new(Style::load(cli.config.as_deref())?, (&viewport).into());
            view.try_load(&input)?;
            if collapse_all {
                view.collapse_all();
            }
            view.on_scroll(scroll);
            print_view(&view).map_err(output_error)?;
        }
        Commands::Serve { socket, viewport } => {
            let view = view::shared(DiffView::new(
                Style::load(cli.config.as_deref())?,
                (&viewport).into(),
            ));
            server::serve(&socket, &view)?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "touchdiff", &mut io::stdout());
        }
        Commands::Man => {
            clap_mangen::Man::new(Cli::command())
                .render(&mut io::stdout())
                .map_err(output_error)?;
        }
    }

    Ok(())
}

fn read_input(file: Option<&Path>) -> Result<Vec<u8>, TouchdiffError> {
    let result = match file {
        Some(path) => std::fs::read(path),
        None => {
            let mut buffer = Vec::new();
            io::stdin().lock().read_to_end(&mut buffer).map(|_| buffer)
        }
    };
    result.map_err(|e| TouchdiffError::Input {
        message: e.to_string(),
    })
}

fn print_view(view: &DiffView) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for item in view.visible_nodes() {
        writeln!(out, "{item}")?;
    }
    writeln!(
        out,
        "{} (scroll {:.1} of {:.1})",
        view.stats(),
        view.scroll_y(),
        view.content_height()
    )
}

fn output_error(e: io::Error) -> TouchdiffError {
    TouchdiffError::Output {
        message: e.to_string(),
    }
}
