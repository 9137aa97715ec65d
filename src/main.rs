use log::info;
use shotbook::config::RunConfig;
use shotbook::error::CompileError;
use shotbook::pipeline::ReportCompiler;
use shotbook::source::ManifestFileSource;
use shotbook_render_lopdf::{LopdfEngine, PngProber};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), CompileError> {
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let config_path = match (args.next(), args.next()) {
        (Some(path), None) => PathBuf::from(path),
        _ => {
            eprintln!("Usage: shotbook <config.yml>");
            std::process::exit(1);
        }
    };

    let config = RunConfig::from_yaml_file(&config_path)?;
    let source = ManifestFileSource::new(config.manifest_path());
    let compiler = ReportCompiler::new(config, source, LopdfEngine::new(), PngProber::new());

    let report = compiler.run().await?;
    info!(
        "run complete: {} document(s) written, {} viewport(s) skipped",
        report.produced(),
        report.skipped()
    );
    Ok(())
}
