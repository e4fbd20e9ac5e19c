use clap::Parser;
use miette::Result;
use shopfloor::cli::helpers::load_config;
use shopfloor::cli::Cli;
use shopfloor::core::logging;

fn main() -> Result<()> {
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

    let config = load_config(&cli.global);
    logging::init(&config.logging, cli.global.verbose);

    shopfloor::cli::commands::run(cli)
}
