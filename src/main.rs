//! LightPath binary

use lightpath::LightPathCli;
use std::process;

fn main() {
    let mut cli = LightPathCli::new();

    if let Err(e) = cli.run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
