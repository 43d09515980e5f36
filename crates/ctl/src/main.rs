use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use lifeline_core::api::{
    EngineStatus, IngestResponse, MotionIngestRequest, MotionReading, VolumeIngestRequest,
};
use lifeline_core::EmergencyConfig;
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "lifelinectl")]
struct Args {
    /// Daemon base URL.
    #[arg(long, global = true, default_value = "http://127.0.0.1:8787")]
    daemon: String,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Send one accelerometer reading.
    Motion {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        #[arg(allow_negative_numbers = true)]
        z: f64,
    },
    /// Report a volume level change.
    Volume { level: i32 },
    /// Play back a JSON-lines event script.
    Replay { file: String },
    Config {
        #[command(subcommand)]
        config: ConfigCmd,
    },
    Status,
}

#[derive(Subcommand, Debug)]
enum ConfigCmd {
    Show,
    Set {
        #[arg(long)]
        number: String,
        #[arg(long = "email", required = true)]
        emails: Vec<String>,
    },
    Reset,
}

/// One line of a replay script.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ReplayStep {
    Motion(MotionReading),
    Volume(i32),
    SleepMs(u64),
}

struct Client {
    http: reqwest::Client,
    base: String,
}

impl Client {
    fn new(daemon: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: daemon.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn motion(&self, reading: MotionReading) -> anyhow::Result<IngestResponse> {
        let resp = self
            .http
            .post(self.url("/v1/motion"))
            .json(&MotionIngestRequest::Single(reading))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp)
    }

    async fn volume(&self, value: i32) -> anyhow::Result<IngestResponse> {
        let resp = self
            .http
            .post(self.url("/v1/volume"))
            .json(&VolumeIngestRequest { value })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp)
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn replay(client: &Client, file: &str) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(file).await.context("read replay file")?;
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step: ReplayStep = serde_json::from_str(line)
            .with_context(|| format!("parse line {}", idx + 1))?;
        let resp = match step {
            ReplayStep::Motion(reading) => client.motion(reading).await?,
            ReplayStep::Volume(value) => client.volume(value).await?,
            ReplayStep::SleepMs(ms) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                continue;
            }
        };
        for outcome in &resp.outcomes {
            println!("line {}: {}", idx + 1, serde_json::to_string(outcome)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let client = Client::new(&args.daemon);

    match args.cmd {
        Cmd::Motion { x, y, z } => print_json(&client.motion(MotionReading { x, y, z }).await?)?,
        Cmd::Volume { level } => print_json(&client.volume(level).await?)?,
        Cmd::Replay { file } => replay(&client, &file).await?,
        Cmd::Config { config } => match config {
            ConfigCmd::Show => {
                let resp = client.http.get(client.url("/v1/config")).send().await?;
                if resp.status() == reqwest::StatusCode::NOT_FOUND {
                    println!("no emergency contact configured");
                    return Ok(());
                }
                let config: EmergencyConfig = resp.error_for_status()?.json().await?;
                print_json(&config)?;
            }
            ConfigCmd::Set { number, emails } => {
                let resp = client
                    .http
                    .put(client.url("/v1/config"))
                    .json(&EmergencyConfig::new(number, emails))
                    .send()
                    .await?;
                if resp.status() == reqwest::StatusCode::BAD_REQUEST {
                    let body: lifeline_core::api::ApiError = resp.json().await?;
                    bail!("rejected: {}", body.error);
                }
                let saved: EmergencyConfig = resp.error_for_status()?.json().await?;
                print_json(&saved)?;
            }
            ConfigCmd::Reset => {
                client
                    .http
                    .delete(client.url("/v1/config"))
                    .send()
                    .await?
                    .error_for_status()?;
                println!("emergency contacts reset");
            }
        },
        Cmd::Status => {
            let status: EngineStatus = client
                .http
                .get(client.url("/v1/status"))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            print_json(&status)?;
        }
    }

    Ok(())
}
