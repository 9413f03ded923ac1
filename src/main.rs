use clap::Parser;
use miette::Result;
use ptrack::cli::commands;
use ptrack::cli::{Cli, Commands, GlobalOpts};

fn main() -> Result<()> {
    // Reset SIGPIPE so piping into `head` or `grep -q` exits quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(&global, matches!(cli.command, Commands::Serve(_)));

    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Product(cmd) => commands::product::run(cmd, &global),
        Commands::Batch(cmd) => commands::batch::run(cmd, &global),
        Commands::Status(args) => commands::status::run(args, &global),
        Commands::Serve(args) => commands::serve::run(args, &global),
        Commands::Config(cmd) => commands::config::run(cmd, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

/// Log to stderr; RUST_LOG overrides the level picked from the flags
fn init_logging(global: &GlobalOpts, serving: bool) {
    let level = if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else if serving {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ptrack={}", level).into()),
        )
        .init();
}
