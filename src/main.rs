// Entrypoint for the CLI.
// - Logging goes through env_logger (`RUST_LOG` overrides the `info` default).
// - Any error propagates out of `main`, which prints it and exits non-zero.

use build_request_parser::{cli::Args, config::Endpoints, ui};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse_args();
    let report = ui::run(&args, &Endpoints::from_env())?;

    println!(
        "Submitted {} part(s) as '{}' to {} ({})",
        report.document.parts().len(),
        report.document.display_id(),
        report.session.server_url,
        report.session.target
    );
    Ok(())
}
