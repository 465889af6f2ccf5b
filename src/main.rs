use cycletime::cli::{report, run};

fn main() {
    if let Err(e) = run() {
        std::process::exit(report(&e));
    }
}
