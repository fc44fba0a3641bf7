//! Banner binary for the sprinkler engine

fn main() {
    println!("Sprinkler Engine v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Trajectory and lawn coverage engine for a two-axis garden sprinkler.");
    println!("The library is meant to be embedded; the command-line tool is sprinkler-cli.");
    println!();
    println!("To use as a Rust library:");
    println!("  Add to Cargo.toml: sprinkler-engine = \"0.1\"");
    println!();
    println!("To sweep a lawn from the shell:");
    println!("  sprinkler-cli sweep --config config/default_config.json");
}
