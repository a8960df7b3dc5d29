fn main() {
    if let Err(err) = atmention::cli::main() {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
