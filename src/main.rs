// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use process_engine::config::{coerce_env_value, ConfigLoader, ConfigPluginSource, EngineSettings};
use process_engine::engine::Dispatcher;
use process_engine::observability::init_tracing;
use process_engine::options::{OptionValue, Options};
use process_engine::plugins::BuiltinPlugins;
use process_engine::registry::DiscoveryReport;
use serde_json::json;

const COMPONENT: &str = "process";

/// Parsed command line
#[derive(Debug, Default)]
struct Invocation {
    config: Option<PathBuf>,
    list: bool,
    options: Options,
    plugin: Option<String>,
    input: Option<String>,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {0} [--config FILE] [--option KEY=VALUE ...] <plugin> <input>\n       {0} [--config FILE] --list\n\
         Example: {0} change_text_case \"hello world\" --option case=title\n\
         Example: {0} --config process.yaml speech_synthesis \"Hello\" --option voice=default",
        program
    )
}

fn parse_args(args: &[String]) -> anyhow::Result<Invocation> {
    let mut invocation = Invocation::default();
    let mut positional = Vec::new();
    let mut rest = args.iter().skip(1);

    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--config" => {
                let path = rest.next().context("--config needs a file path")?;
                invocation.config = Some(PathBuf::from(path));
            }
            "--option" => {
                let pair = rest.next().context("--option needs KEY=VALUE")?;
                let (key, raw) = pair
                    .split_once('=')
                    .with_context(|| format!("option '{}' is not KEY=VALUE", pair))?;
                let value: OptionValue = serde_json::from_value(coerce_env_value(raw))
                    .with_context(|| format!("option '{}' has an unusable value", key))?;
                invocation.options.insert(key, value);
            }
            "--list" => invocation.list = true,
            _ => positional.push(arg.clone()),
        }
    }

    if invocation.list {
        return Ok(invocation);
    }

    let mut positional = positional.into_iter();
    match (positional.next(), positional.next(), positional.next()) {
        (Some(plugin), Some(input), None) => {
            invocation.plugin = Some(plugin);
            invocation.input = Some(input);
            Ok(invocation)
        }
        _ => bail!("expected exactly <plugin> and <input>"),
    }
}

fn report_discovery(source: &str, report: &DiscoveryReport) {
    for failure in &report.failures {
        eprintln!(
            "⚠️  {}: plugin '{}' was not registered: {}",
            source, failure.candidate, failure.error
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("process-engine");

    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("{}\n\n{}", e, usage(program));
            std::process::exit(2);
        }
    };

    let mut loader = ConfigLoader::new(COMPONENT);
    if let Some(path) = &invocation.config {
        loader = loader.with_file(path);
    }
    let snapshot = loader.load().context("failed to load configuration")?;
    let settings = EngineSettings::from_snapshot(&snapshot).context("invalid configuration")?;

    init_tracing(&settings.log_level);

    let dispatcher = Dispatcher::from_settings(&settings);
    report_discovery("builtin", &dispatcher.registry().discover(&BuiltinPlugins));
    let config_label = invocation
        .config
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "configuration".to_string());
    let configured = ConfigPluginSource::new(config_label.clone(), settings.plugins.clone());
    report_discovery(&config_label, &dispatcher.registry().discover(&configured));

    if invocation.list {
        let statuses = dispatcher.plugin_statuses();
        let plugins: Vec<_> = dispatcher
            .list_plugins()
            .iter()
            .map(|descriptor| {
                json!({
                    "name": descriptor.name(),
                    "version": descriptor.version(),
                    "description": descriptor.description(),
                    "status": statuses.get(descriptor.name()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&plugins)?);
        dispatcher.shutdown();
        return Ok(());
    }

    let (Some(plugin), Some(input)) = (invocation.plugin, invocation.input) else {
        bail!("{}", usage(program));
    };

    let outcome = dispatcher.run(&plugin, input, invocation.options).await;
    dispatcher.shutdown();

    match outcome {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(result.as_ref())?);
            Ok(())
        }
        Err(error) => {
            println!("{}", serde_json::to_string_pretty(&error.to_json())?);
            std::process::exit(1);
        }
    }
}
