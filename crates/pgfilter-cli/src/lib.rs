mod cli;
mod config;
mod logging;
mod render;

pub fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    logging::init(cmd.verbose());

    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Where(args) => render::run_where(args),
        cli::Command::Select(args) => render::run_select(args),
    }
}
