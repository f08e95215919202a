fn main() {
    if let Err(e) = pgfilter_cli::run(std::env::args().collect()) {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
