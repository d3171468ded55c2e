fn main() {
    if let Err(err) = bond_intake::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
