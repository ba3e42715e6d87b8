use crate::tool::{Output, Tool};
use anyhow::{Context, bail};
use clap::{Command, CommandFactory, Parser, Subcommand};
use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};
use walkdir::WalkDir;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_\-']+$").unwrap());
static REGION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((.*?)\)").unwrap());

const ROMANS: [&str; 9] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX"];

const SIZE_UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

const BLOCK_SIZE: u64 = 128 * 1024;

#[derive(Parser, Debug)]
#[command(
    name = "catalog",
    about = "Prepare a directory of game dumps for the download pages"
)]
pub struct CatalogTool {
    #[command(subcommand)]
    command: CatalogCommand,
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Write a CSV listing title, slug and size of every file
    Csv {
        /// Directory to scan (recursively)
        #[arg(short, long, default_value = ".")]
        src_dir: PathBuf,
        /// Directory to write the CSV into
        #[arg(short, long, default_value = ".")]
        dest_dir: PathBuf,
        /// Name of the CSV file
        #[arg(short, long, default_value = "games.csv")]
        output_file: String,
    },
    /// Symlink every file into a directory under its slug
    #[command(alias = "ln")]
    Link {
        /// Directory to scan (recursively)
        #[arg(short, long, default_value = ".")]
        src_dir: PathBuf,
        /// Directory to create the links in
        #[arg(short, long)]
        dest_dir: PathBuf,
    },
}

impl Tool for CatalogTool {
    fn cli() -> Command {
        CatalogTool::command()
    }

    fn execute(&self) -> anyhow::Result<Option<Output>> {
        match &self.command {
            CatalogCommand::Csv {
                src_dir,
                dest_dir,
                output_file,
            } => {
                validate_dirs(&[src_dir, dest_dir])?;

                let path = dest_dir.join(output_file);
                write_csv(src_dir, &path)?;

                Ok(Some(Output::Text(format!(
                    "Created csv at {}\n",
                    path.display()
                ))))
            }
            CatalogCommand::Link { src_dir, dest_dir } => {
                validate_dirs(&[src_dir, dest_dir])?;
                create_links(src_dir, dest_dir)?;

                Ok(None)
            }
        }
    }
}

fn validate_dirs(dirs: &[&PathBuf]) -> anyhow::Result<()> {
    for dir in dirs {
        if !dir.is_dir() {
            bail!("Directory {} does not exist", dir.display());
        }
    }
    Ok(())
}

// Every regular file under the directory, with absolute paths.
fn files(src_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let root = src_dir
        .canonicalize()
        .context("Could not resolve source directory")?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.context("Could not walk source directory")?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn file_name(path: &Path) -> anyhow::Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Could not read file name of {}", path.display()))
}

fn write_csv(src_dir: &Path, path: &Path) -> anyhow::Result<()> {
    let mut rows = Vec::new();
    for file in files(src_dir)? {
        let name = file_name(&file)?;
        let size = fs::metadata(&file)
            .with_context(|| format!("Could not read size of {}", file.display()))?
            .len();

        rows.push([
            title(name)?,
            simple_filename(name)?,
            convert_size(size),
            format!("{} Blocks", bytes_to_blocks(size)),
        ]);
    }
    rows.sort_by(|a, b| a[1].cmp(&b[1]));

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_path(path)
        .context("Could not create csv file")?;
    writer
        .write_record(["title", "filename", "size_bytes", "size_blocks"])
        .context("Could not write csv header")?;
    for row in &rows {
        writer.write_record(row).context("Could not write csv row")?;
    }
    writer.flush().context("Could not write csv file")?;

    tracing::debug!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn create_links(src_dir: &Path, dest_dir: &Path) -> anyhow::Result<()> {
    for file in files(src_dir)? {
        let link = dest_dir.join(simple_filename(file_name(&file)?)?);

        if link.symlink_metadata().is_ok() {
            fs::remove_file(&link)
                .with_context(|| format!("Could not replace {}", link.display()))?;
        }

        symlink(&file, &link)
            .with_context(|| format!("Could not link {}", link.display()))?;
        tracing::debug!("linked {} -> {}", link.display(), file.display());
    }
    Ok(())
}

#[cfg(unix)]
fn symlink(original: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn symlink(original: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(original, link)
}

// Splits "name.ext" into ("name", ".ext").
fn split_extension(filename: &str) -> (&str, &str) {
    let path = Path::new(filename);
    match (path.file_stem().and_then(|s| s.to_str()), path.extension()) {
        (Some(stem), Some(_)) => filename.split_at(stem.len()),
        _ => (filename, ""),
    }
}

fn roman_to_int(word: &str) -> Option<usize> {
    ROMANS.iter().position(|roman| *roman == word).map(|i| i + 1)
}

// The first parenthesised part of the name, e.g. "USA".
fn region(name: &str) -> anyhow::Result<&str> {
    REGION
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .with_context(|| format!("No region in '{}'", name))
}

/// Lowercase, dash separated slug of a file name, keeping the extension.
/// "Final Fantasy IV (USA).3ds" becomes "final-fantasy-4-usa.3ds".
fn simple_filename(filename: &str) -> anyhow::Result<String> {
    let (name, ext) = split_extension(filename);

    let mut tokens = Vec::new();
    for word in name.split_whitespace() {
        if word == "-" {
            continue;
        } else if let Some(number) = roman_to_int(word) {
            tokens.push(number.to_string());
        } else if WORD.is_match(word) {
            tokens.push(word.to_lowercase().replace('\'', ""));
        }
    }

    let region = region(name)?.to_lowercase();

    Ok(format!("{}-{}{}", tokens.join("-"), region, ext))
}

// "Zelda - Ocarina of Time (USA).3ds" becomes "Zelda: Ocarina of Time".
fn title(filename: &str) -> anyhow::Result<String> {
    let (name, _) = split_extension(filename);
    let region = region(name)?;

    Ok(name
        .replacen(" - ", ": ", 1)
        .replace(&format!(" ({})", region), ""))
}

fn convert_size(size_bytes: u64) -> String {
    if size_bytes == 0 {
        return "0 B".to_string();
    }

    let i = ((size_bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let i = i.min(SIZE_UNITS.len() - 1);
    let p = 1024f64.powi(i as i32);
    let s = (size_bytes as f64 / p * 100.0).round() / 100.0;

    format!("{:?} {}", s, SIZE_UNITS[i])
}

fn bytes_to_blocks(size_bytes: u64) -> u64 {
    size_bytes / BLOCK_SIZE
}
