fn main() {
    if let Err(err) = ink_backup::cli::run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}
