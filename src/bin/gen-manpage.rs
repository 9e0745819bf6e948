//! Writes the cdcectl(1) man page
//!
//! Usage: gen-manpage [output-dir]

use clap::CommandFactory;
use std::fs;
use std::path::PathBuf;

#[path = "../cli.rs"]
#[allow(dead_code)]
mod cli;

fn main() -> std::io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    fs::create_dir_all(&output_dir)?;

    let mut buffer = Vec::new();
    clap_mangen::Man::new(cli::Cli::command()).render(&mut buffer)?;

    let output_path = output_dir.join("cdcectl.1");
    fs::write(&output_path, buffer)?;
    println!("Man page written to {}", output_path.display());
    println!("View with: man -l {}", output_path.display());
    Ok(())
}
