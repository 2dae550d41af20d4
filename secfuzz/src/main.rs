fn main() {
    if let Err(e) = secfuzz::run_cli() {
        eprintln!("{e:?}");
        std::process::exit(1);
    }
}
