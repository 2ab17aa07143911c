use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payment_bridge::application::bridge::PaymentBridge;
use payment_bridge::domain::ports::Activity;
use payment_bridge::infrastructure::simulated::{SdkCallLog, SimulatedSdkFactory, StaticActivityHost};
use payment_bridge::interfaces::host::{HostCall, Invocation, Reply, dispatch};
use payment_bridge::interfaces::script::reader::{ScriptLine, ScriptReader};
use payment_bridge::interfaces::script::writer::{ReplyRecord, ReplyWriter};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_ACTIVITY: &str = "MainActivity";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON-lines script of invocations and activity results
    script: PathBuf,

    /// Publishable key to initialize the bridge with before the script runs
    #[arg(long, env = "PAYMENT_BRIDGE_PUBLISHABLE_KEY")]
    publishable_key: Option<String>,

    /// Start without a foreground activity
    #[arg(long)]
    no_activity: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let host = StaticActivityHost::new((!cli.no_activity).then(|| Activity::new(DEFAULT_ACTIVITY)));
    let bridge = PaymentBridge::new(
        Box::new(SimulatedSdkFactory::new(SdkCallLog::new())),
        Box::new(host.clone()),
    );

    if let Some(publishable_key) = cli.publishable_key {
        bridge.initialize(&publishable_key).await.into_diagnostic()?;
    }

    // Run the script
    let file = File::open(cli.script).into_diagnostic()?;
    let reader = ScriptReader::new(file);
    let mut calls: Vec<(String, HostCall)> = Vec::new();
    for line in reader.lines() {
        match line {
            Ok(ScriptLine::Invoke(raw)) => {
                let method = raw
                    .get("method")
                    .and_then(|m| m.as_str())
                    .unwrap_or("unknown")
                    .to_string();
                let call = match Invocation::from_value(raw) {
                    Ok(invocation) => dispatch(&bridge, invocation).await,
                    Err(e) => HostCall::Settled(Reply::rejected(&e)),
                };
                calls.push((method, call));
            }
            Ok(ScriptLine::ActivityResult(result)) => bridge.on_activity_result(result).await,
            Ok(ScriptLine::Activity(name)) => host.set_activity(name.map(Activity::new)),
            Err(e) => {
                eprintln!("Error reading script line: {}", e);
            }
        }
    }

    // Output one reply per invocation, in script order
    let records = calls
        .into_iter()
        .enumerate()
        .map(|(idx, (method, mut call))| ReplyRecord {
            call: idx + 1,
            method,
            request_code: call.request_code(),
            reply: call.poll_reply().unwrap_or(Reply::Pending),
        });

    let stdout = io::stdout();
    let mut writer = ReplyWriter::new(stdout.lock());
    writer.write_records(records).into_diagnostic()?;

    Ok(())
}
