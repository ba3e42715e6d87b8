use std::fs;
use std::io::{self, Read};
use std::str::FromStr;

use anyhow::Context;
use clap::Args;
use serde_json::{Value, json};

use crate::context;

/// The contents of a file, or of stdin when the value is "-".
#[derive(Debug, Clone)]
pub struct FileInput(pub String);

impl FromStr for FileInput {
    type Err = std::io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(FileInput(buffer))
        } else {
            Ok(FileInput(fs::read_to_string(s)?))
        }
    }
}

impl AsRef<str> for FileInput {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A `path=value` pair, e.g. `site.url=https://example.com`.
#[derive(Debug, Clone)]
pub struct Assignment(pub String, pub String);

impl FromStr for Assignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((path, _)) if path.trim().is_empty() => Err("Path cannot be empty".to_string()),
            Some((path, value)) => Ok(Assignment(path.trim().to_string(), value.to_string())),
            None => Err("Expected a path=value pair".to_string()),
        }
    }
}

// Where the rendering context comes from. Shared by every tool.
#[derive(Args, Debug, Default)]
pub struct ContextArgs {
    /// JSON file holding the rendering context. Use "-" for stdin
    #[arg(short, long)]
    pub context: Option<FileInput>,

    /// Set a string value in the context (e.g. site.url=https://example.com)
    #[arg(short, long = "set", value_name = "PATH=VALUE")]
    pub set: Vec<Assignment>,
}

impl ContextArgs {
    pub fn load(&self) -> anyhow::Result<Value> {
        let mut ctx = match &self.context {
            Some(input) => {
                serde_json::from_str(input.as_ref()).context("Could not parse context as JSON")?
            }
            None => json!({}),
        };

        for Assignment(path, value) in &self.set {
            tracing::debug!("setting '{}' in context", path);
            context::assign(&mut ctx, path, json!(value));
        }

        Ok(ctx)
    }
}
