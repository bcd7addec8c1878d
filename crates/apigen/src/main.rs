//! `unreal-apigen` binary.

fn main() {
    std::process::exit(unreal_apigen_cli::run_cli(std::env::args().collect()));
}
