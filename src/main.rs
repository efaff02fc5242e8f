fn main() {
    if let Err(e) = specamp::runtime::run() {
        eprintln!("specamp: {e}");
        std::process::exit(1);
    }
}
