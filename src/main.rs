use anyhow::{Context, Result};
use namewise::{cli, llm, run};
use tracing_subscriber::EnvFilter;

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = match cli::Args::try_parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(err) => {
            err.print()?;
            std::process::exit(cli::exit_code(&err));
        }
    };
    init_tracing(args.log_level());

    let selector = args.selector();
    let config = args.config();
    let file = args.file.display().to_string();

    let prepared = run::prepare(&args.file, &selector, &config)
        .with_context(|| format!("failed to analyze {file}"))?;

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&prepared)?);
        return Ok(());
    }
    if args.show_prompt {
        eprintln!("{}", prepared.prompt);
    }

    let adapter = llm::CommandAdapter::new(config.ollama_model.as_str());
    let result = run::suggest(prepared, &adapter, &config)
        .with_context(|| format!("failed to get suggestions from {}", config.provider))?;
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
