mod display;
mod terminal;

use std::io::IsTerminal;

use clap::Parser;
use kt_core::actions::ActionExecutor;
use kt_core::backend::OpenAiBackend;
use kt_core::config::TriageConfig;
use kt_core::k8s::FailureScanner;
use kt_core::logging;
use kt_core::prelude::*;
use kt_core::session::{
    InteractiveController,
    ScanScope,
    SwitchSignal,
};
use tracing::*;

use crate::display::Display;
use crate::terminal::{
    PipedOperator,
    TerminalOperator,
};

#[derive(Parser)]
#[command(about = "interactive troubleshooting assistant for unready Kubernetes pods", version)]
struct KtCommandRoot {
    #[arg(
        short,
        long,
        long_help = "only look for unready pods in this namespace; without this (or --all-namespaces) \
                     you are asked to pick one at startup"
    )]
    namespace: Option<String>,

    #[arg(short = 'A', long, conflicts_with = "namespace", long_help = "look for unready pods in every namespace")]
    all_namespaces: bool,

    #[arg(short, long, long_help = "location of the kubetriage config file")]
    config_file: Option<String>,

    #[arg(short, long, long_help = "reasoning model to use; overrides the config file")]
    model: Option<String>,

    #[arg(short, long, default_value = "warn")]
    verbosity: String,
}

fn scan_scope(args: &KtCommandRoot) -> ScanScope {
    match args.namespace.as_ref() {
        Some(ns) => ScanScope::Namespace(ns.clone()),
        None if args.all_namespaces => ScanScope::AllNamespaces,
        None => ScanScope::Prompt,
    }
}

fn load_config(args: &KtCommandRoot) -> anyhow::Result<TriageConfig> {
    let mut config = match args.config_file.as_ref() {
        Some(filename) => TriageConfig::load(filename)?,
        None => TriageConfig::default(),
    };
    if let Some(model) = args.model.as_ref() {
        config.backend.model = model.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> EmptyResult {
    let args = KtCommandRoot::parse();
    let interactive = std::io::stdin().is_terminal();
    logging::setup_for_cli(&args.verbosity, interactive);

    if let Err(err) = dotenvy::dotenv() {
        debug!("no .env file loaded: {err}");
    }
    let config = load_config(&args)?;

    let api_key = match std::env::var(&config.backend.api_key_env) {
        Ok(key) if !key.is_empty() => key,
        _ => anyhow::bail!("{} is not set; export it or add it to a .env file", config.backend.api_key_env),
    };
    info!("using model {} at {}", config.backend.model, config.backend.base_url);

    let client = kube::Client::try_default().await?;
    let backend = OpenAiBackend::new(&config.backend, &api_key);
    let executor = ActionExecutor::new(client.clone(), &config.actions);
    let switch = SwitchSignal::new();
    let display = Display::new(config.session.display_truncate_chars)?;

    let mut controller = InteractiveController::new(
        FailureScanner::new(client),
        &backend,
        &executor,
        switch.clone(),
        config.session.clone(),
    );

    let scope = scan_scope(&args);
    if interactive {
        let mut operator = TerminalOperator::start(switch, display)?;
        controller.run(&scope, &mut operator).await?;
    } else {
        let mut operator = PipedOperator::new(display);
        controller.run(&scope, &mut operator).await?;
    }

    println!("👋 Exiting debugger.");
    Ok(())
}
