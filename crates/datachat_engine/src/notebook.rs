use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value};
use thiserror::Error;

use crate::persist::{write_atomically, PersistError};

pub const DEFAULT_NOTEBOOK_FILE: &str = "output.ipynb";

#[derive(Debug, Error)]
pub enum NotebookError {
    #[error("serializing notebook: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("writing notebook: {0}")]
    Persist(#[from] PersistError),
}

fn code_fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"```(?:python)?\s*([\s\S]*?)\s*```").expect("code fence pattern is valid")
    })
}

/// Bodies of the fenced code blocks in `markdown`, in order. Unterminated
/// fences are ignored.
pub fn extract_code_blocks(markdown: &str) -> Vec<String> {
    code_fence()
        .captures_iter(markdown)
        .filter_map(|caps| caps.get(1))
        .map(|body| body.as_str().to_string())
        .collect()
}

/// nbformat 4.5 document with one code cell per entry.
pub fn build_notebook(cells: &[String]) -> Value {
    let cells: Vec<Value> = cells
        .iter()
        .enumerate()
        .map(|(idx, code)| {
            let source: Vec<&str> = code.split_inclusive('\n').collect();
            json!({
                "cell_type": "code",
                "id": format!("cell-{}", idx + 1),
                "source": source,
                "metadata": {},
                "outputs": [],
                "execution_count": null,
            })
        })
        .collect();

    json!({
        "cells": cells,
        "metadata": {},
        "nbformat": 4,
        "nbformat_minor": 5,
    })
}

pub fn write_notebook(path: &Path, cells: &[String]) -> Result<(), NotebookError> {
    let content = serde_json::to_string_pretty(&build_notebook(cells))?;
    write_atomically(path, &content)?;
    Ok(())
}
