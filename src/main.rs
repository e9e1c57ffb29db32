use clap::Parser;
use miette::Result;
use nutriswap::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    // This is standard practice for CLI tools that output to stdout.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    // Install miette's fancy error handler for beautiful diagnostics
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

    match cli.command {
        Commands::Init(args) => nutriswap::cli::commands::init::run(args, &global),
        Commands::Browse => nutriswap::cli::commands::browse::run(&global),
        Commands::Favorites => nutriswap::cli::commands::favorites::run(&global),
        Commands::List(cmd) => nutriswap::cli::commands::list::run(cmd, &global),
        Commands::Update(args) => nutriswap::cli::commands::update::run(args, &global),
        Commands::Clear(args) => nutriswap::cli::commands::clear::run(args, &global),
        Commands::Status => nutriswap::cli::commands::status::run(&global),
        Commands::Completions(args) => nutriswap::cli::commands::completions::run(args),
    }
}
