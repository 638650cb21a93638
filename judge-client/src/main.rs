//! judge-client - terminal rater for the human-judgement study

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use judge_client::{run_session, ClientError, RaterInput, StudyClient, VoteSource};
use judge_common::api::ScenarioPayload;
use judge_common::VoteSymbol;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for judge-client
#[derive(Parser, Debug)]
#[command(name = "judge-client")]
#[command(about = "Terminal rater for the human-judgement study")]
#[command(version)]
struct Args {
    /// Study server base URL
    #[arg(long, env = "JUDGE_SERVER", default_value = "http://127.0.0.1:5760")]
    server: String,

    #[arg(short, long, env = "JUDGE_USERNAME")]
    username: String,

    #[arg(long, env = "JUDGE_PASSWORD")]
    password: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "JUDGE_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("judge_client={}", args.log_level))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut client = StudyClient::new(&args.server).context("Failed to create HTTP client")?;
    client
        .login(&args.username, &args.password)
        .await
        .with_context(|| format!("Failed to sign in to {}", args.server))?;

    let mut rater = TerminalRater::new();
    let outcome = run_session(&client, &mut rater).await;

    if let Err(e) = client.logout().await {
        warn!("Failed to sign out: {}", e);
    }

    let summary = outcome.context("Study session failed")?;
    if summary.complete {
        println!("\nAll scenarios judged. Thank you!");
    } else {
        println!("\nSaved {} scenarios this session.", summary.submitted);
    }
    info!("Submitted {} scenarios", summary.submitted);
    Ok(())
}

/// Reads votes from standard input
struct TerminalRater {
    lines: Lines<BufReader<Stdin>>,
}

impl TerminalRater {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn prompt(&mut self, text: &str) -> Option<String> {
        let mut stdout = tokio::io::stdout();
        // Prompt display only; a failed write still reads the answer
        let _ = stdout.write_all(text.as_bytes()).await;
        let _ = stdout.flush().await;
        match self.lines.next_line().await {
            Ok(Some(line)) => Some(line.trim().to_lowercase()),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read input: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl VoteSource for TerminalRater {
    fn present(&mut self, scenario: &ScenarioPayload, progress_percent: u32) {
        println!(
            "\n=== Scenario {} of {} ({}% done) ===\n",
            scenario.scenario_number, scenario.scenario_total, progress_percent
        );
        println!("{}\n", scenario.scenario);
        println!("--- Response 1 ---\n{}\n", scenario.response1);
        println!("--- Response 2 ---\n{}\n", scenario.response2);
    }

    async fn next_vote(&mut self, criterion_index: usize, criterion: &str) -> RaterInput {
        println!("Criterion {}: {}", criterion_index + 1, criterion);
        loop {
            let Some(answer) = self
                .prompt("[1] response 1  [t] tie  [b] both miss  [2] response 2  [q] quit > ")
                .await
            else {
                return RaterInput::Quit;
            };
            if answer == "q" {
                return RaterInput::Quit;
            }
            match answer.parse::<VoteSymbol>() {
                Ok(symbol) => return RaterInput::Vote(symbol),
                Err(_) => println!("Please enter 1, t, b, 2 or q."),
            }
        }
    }

    async fn retry_submission(&mut self, error: &ClientError) -> bool {
        println!("Could not save your votes: {}", error);
        matches!(
            self.prompt("Retry submission? [y/n] > ").await.as_deref(),
            Some("y") | Some("yes")
        )
    }
}
