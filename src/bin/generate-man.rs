// Render man pages for cycletime and each of its subcommands
//
// Usage: generate-man [OUT_DIR]   (default: ./man)

use clap::CommandFactory;
use clap_mangen::Man;
use std::fs::File;
use std::path::PathBuf;

use cycletime::cli::Cli;

fn main() -> std::io::Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    std::fs::create_dir_all(&out_dir)?;

    let cmd = Cli::command();
    let mut file = File::create(out_dir.join("cycletime.1"))?;
    Man::new(cmd.clone()).render(&mut file)?;

    for sub in cmd.get_subcommands() {
        let page = format!("cycletime-{}", sub.get_name());
        let mut file = File::create(out_dir.join(format!("{}.1", page)))?;
        Man::new(sub.clone()).title(page).render(&mut file)?;
    }

    println!("Man pages written to {}", out_dir.display());
    Ok(())
}
