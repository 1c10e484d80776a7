use warpfield::Starfield;

fn main() {
    if let Err(e) = Starfield::new().run() {
        eprintln!("Starfield failed: {}", e);
        std::process::exit(1);
    }
}
