//! Command-line entry point: resolve configuration and dispatch

pub mod args;

use std::sync::Arc;

use tracing::{error, info};

pub use args::{Args, LogFormat};

use crate::config::ServerConfig;
use crate::env::EnvVars;
use crate::errors::{Result, SpecmockError};
use crate::generate::OpenAiGenerator;
use crate::mock::{envelope_schema, MockEngine, MockServer};
use crate::openapi::{load_spec, SpecDocument};
use crate::routing::Router;
use crate::status::ExitStatus;

/// Run the CLI with parsed arguments
pub async fn run(args: Args) -> ExitStatus {
    match execute(&args).await {
        Ok(status) => status,
        Err(e) => {
            error!(error = %e, "specmock failed");
            eprintln!("specmock: {}", e);
            ExitStatus::Error
        }
    }
}

async fn execute(args: &Args) -> Result<ExitStatus> {
    let env = EnvVars::load();
    let config = resolve_config(args, &env)?;

    let spec_path = config
        .spec
        .clone()
        .ok_or_else(|| SpecmockError::Config("No spec file given: pass SPEC or set `spec` in the config file".to_string()))?;
    let spec = Arc::new(load_spec(&spec_path)?);

    if args.list {
        list_operations(&spec);
        return Ok(ExitStatus::Success);
    }

    if let Some(target) = &args.print_schema {
        return print_schema(spec, target);
    }

    config.validate()?;
    serve(config, spec).await
}

/// Merge config file, environment and flags, in increasing precedence
pub fn resolve_config(args: &Args, env: &EnvVars) -> Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path, env)?,
        None => ServerConfig::default(),
    };

    if let Some(provider) = args.provider {
        config.generator.provider = Some(provider);
    }
    if let Some(ref key) = args.api_key {
        config.generator.api_key = key.clone();
    }
    config.generator.apply_env(env);

    if let Some(ref spec) = args.spec {
        config.spec = Some(spec.clone());
    }
    if let Some(ref host) = args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.cors {
        config.cors = true;
    }
    if args.no_log {
        config.log_requests = false;
    }
    if let Some(ref model) = args.model {
        config.generator.model = model.clone();
    }
    if let Some(ref base_url) = args.base_url {
        config.generator.base_url = Some(base_url.clone());
    }
    if let Some(ref version) = args.api_version {
        config.generator.api_version = Some(version.clone());
    }
    if let Some(timeout) = args.timeout {
        config.generator.timeout_secs = timeout;
    }

    Ok(config)
}

fn list_operations(spec: &SpecDocument) {
    for (template, item) in &spec.paths {
        for (method, operation) in &item.operations {
            let status = operation
                .first_response()
                .map(|(status, _)| status.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("{:7} {} -> {}", method.to_uppercase(), template, status);
        }
    }
}

fn print_schema(spec: Arc<SpecDocument>, target: &[String]) -> Result<ExitStatus> {
    let [method, path] = target else {
        return Err(SpecmockError::Argument("--print-schema takes METHOD PATH".to_string()));
    };

    let router = Router::new(spec);
    let route = router.route(method, path)?;
    match envelope_schema(&route) {
        Some(schema) => println!("{}", serde_json::to_string_pretty(&schema)?),
        None => println!("{} {} answers {} with no body", method.to_uppercase(), route.template, route.status),
    }
    Ok(ExitStatus::Success)
}

async fn serve(config: ServerConfig, spec: Arc<SpecDocument>) -> Result<ExitStatus> {
    let generator = OpenAiGenerator::new(config.generator.clone())?;
    info!(
        provider = ?config.generator.provider(),
        model = %config.generator.model,
        endpoint = %generator.endpoint(),
        "Using generator"
    );

    let engine = MockEngine::new(spec, generator).with_system_prompt(&config.generator.system_prompt);
    let server = MockServer::new(config, engine);

    tokio::select! {
        result = server.run() => {
            result?;
            Ok(ExitStatus::Success)
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            Ok(ExitStatus::Interrupted)
        }
    }
}
