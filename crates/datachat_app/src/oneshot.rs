use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use datachat_core::dot_suffix;
use datachat_engine::{
    animate_until_cancelled, extract_code_blocks, prompt, write_notebook, CompletionOptions,
    CompletionRequest, CsvDatasetProvider, DatasetProvider, InferenceClient, OpenAiCompatClient,
    SnapshotMode,
};
use engine_logging::{engine_info, engine_warn};
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;

const ANALYSIS_TEMPERATURE: f32 = 0.2;
const ANALYSIS_MAX_TOKENS: u32 = 500;
const NOTEBOOK_TEMPERATURE: f32 = 0.7;
const NOTEBOOK_MAX_TOKENS: u32 = 4000;

/// Widest dot suffix, used to blank the progress line.
const PROGRESS_PAD: usize = 4;

pub fn run_analyze(config: &AppConfig) -> Result<()> {
    let client = inference_client(config)?;
    let answer = analyze(config, &client)?;
    println!("{answer}");
    Ok(())
}

pub fn run_notebook(config: &AppConfig, output: &Path) -> Result<()> {
    let client = inference_client(config)?;
    generate_notebook(config, &client, output)?;
    println!(
        "Written code is in {}, please be aware this code may have issues and need debugging.",
        output.display()
    );
    Ok(())
}

fn inference_client(config: &AppConfig) -> Result<OpenAiCompatClient> {
    OpenAiCompatClient::new(config.inference.clone()).context("configuring the inference client")
}

fn analyze(config: &AppConfig, client: &dyn InferenceClient) -> Result<String> {
    let snapshot = CsvDatasetProvider::new(&config.dataset_path, config.snapshot_mode)
        .load()
        .context("analysis needs a readable dataset")?;
    let options = options_for(config, ANALYSIS_TEMPERATURE, ANALYSIS_MAX_TOKENS);
    let request = prompt::analysis_request(&snapshot, &options);
    complete_with_progress(client, config.animation_period, "Analyzing Data", &request)
}

/// Writes the notebook and returns its number of code cells.
fn generate_notebook(
    config: &AppConfig,
    client: &dyn InferenceClient,
    output: &Path,
) -> Result<usize> {
    let summary = CsvDatasetProvider::new(&config.dataset_path, SnapshotMode::Summary)
        .load()
        .context("notebook generation needs a readable dataset")?;
    let options = options_for(config, NOTEBOOK_TEMPERATURE, NOTEBOOK_MAX_TOKENS);
    let request = prompt::notebook_request(&summary, &options);

    let answer =
        complete_with_progress(client, config.animation_period, "Generating Notebook", &request)?;
    let cells = extract_code_blocks(&answer);
    if cells.is_empty() {
        engine_warn!("Model answer contained no code blocks; writing an empty notebook");
    }
    write_notebook(output, &cells).with_context(|| format!("writing notebook {output:?}"))?;
    engine_info!("Notebook with {} cells written to {:?}", cells.len(), output);
    Ok(cells.len())
}

fn options_for(config: &AppConfig, temperature: f32, max_tokens: u32) -> CompletionOptions {
    CompletionOptions {
        temperature,
        max_tokens,
        ..config.inference.options()
    }
}

/// Runs one completion while a dot animation plays on stderr. The animation
/// is stopped and its line erased before the result is returned.
fn complete_with_progress(
    client: &dyn InferenceClient,
    period: Duration,
    label: &'static str,
    request: &CompletionRequest,
) -> Result<String> {
    let runtime = tokio::runtime::Runtime::new().context("starting the async runtime")?;

    eprint!("{label}");
    let result = runtime.block_on(async {
        let token = CancellationToken::new();
        let ticker = tokio::spawn(animate_until_cancelled(period, token.clone(), move |tick| {
            let mut stderr = io::stderr();
            let _ = write!(stderr, "\r{label}{:<width$}", dot_suffix(tick), width = PROGRESS_PAD);
            let _ = stderr.flush();
        }));
        let result = client.complete(request).await;
        token.cancel();
        let _ = ticker.await;
        result
    });
    eprint!("\r{}\r", " ".repeat(label.len() + PROGRESS_PAD));

    result.with_context(|| format!("{label} failed"))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use clap::Parser;
    use datachat_engine::{InferenceError, InferenceFailure};
    use tempfile::TempDir;

    use super::*;
    use crate::cli::Cli;
    use crate::config::FileConfig;

    struct FakeClient {
        answer: Result<String, String>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl FakeClient {
        fn answering(text: &str) -> Self {
            Self {
                answer: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                answer: Err(message.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl InferenceClient for FakeClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, InferenceError> {
            self.seen.lock().unwrap().push(request.clone());
            self.answer
                .clone()
                .map_err(|message| InferenceError::new(InferenceFailure::HttpStatus(500), message))
        }
    }

    fn config_for(dir: &TempDir, command: &str) -> AppConfig {
        let dataset = dir.path().join("input.csv");
        fs::write(&dataset, "name,age\nAda,36\nAlan,41\n").unwrap();
        let cli = Cli::parse_from([
            "datachat",
            command,
            "--dataset",
            dataset.to_str().unwrap(),
        ]);
        AppConfig::merge(&cli, FileConfig::default()).unwrap()
    }

    #[test]
    fn notebook_holds_every_code_block_of_the_answer() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir, "notebook");
        let output: PathBuf = dir.path().join("out").join("analysis.ipynb");
        let client = FakeClient::answering(
            "Load it:\n```python\nimport pandas as pd\ndf = pd.read_csv('input.csv')\n```\n\
             Then:\n```\ndf.describe()\n```\n",
        );

        let cells = generate_notebook(&config, &client, &output).unwrap();

        assert_eq!(cells, 2);
        let written = fs::read_to_string(&output).unwrap();
        assert!(written.contains("import pandas as pd"));
        assert!(written.contains("df.describe()"));
        assert!(written.contains("\"nbformat\": 4"));

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].options.max_tokens, NOTEBOOK_MAX_TOKENS);
        assert!(seen[0].user_text.contains("Column Statistics"));
    }

    #[test]
    fn failed_completion_names_the_step_and_keeps_the_cause() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("analysis.ipynb");

        let err = generate_notebook(
            &config_for(&dir, "notebook"),
            &FakeClient::failing("model overloaded"),
            &output,
        )
        .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.starts_with("Generating Notebook failed"));
        assert!(message.contains("http status 500: model overloaded"));
        assert!(!output.exists());

        let err = analyze(
            &config_for(&dir, "analyze"),
            &FakeClient::failing("no route"),
        )
        .unwrap_err();
        assert!(format!("{err:#}").starts_with("Analyzing Data failed"));
    }

    #[test]
    fn analysis_returns_the_answer_text() {
        let dir = TempDir::new().unwrap();
        let client = FakeClient::answering("Ages cluster around 40.");

        let answer = analyze(&config_for(&dir, "analyze"), &client).unwrap();

        assert_eq!(answer, "Ages cluster around 40.");
        let seen = client.seen.lock().unwrap();
        assert_eq!(seen[0].options.temperature, ANALYSIS_TEMPERATURE);
        assert!(seen[0].user_text.contains("\"Ada\""));
    }
}
