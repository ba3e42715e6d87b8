mod args;
mod context;
mod error;
mod qr;
mod template;
mod tool;
mod tools;

use std::io::{self, Write};

use clap::{Arg, ArgAction, ArgMatches, FromArgMatches};

use crate::tool::{Output, Tool};
use anyhow::{Context, anyhow};

// This way of building main is not ideal.
macro_rules! toolbox {
    ($cmd:ident, $setup:expr, $(($tool:path, $name:literal, $($alias:literal),*)),+) => {
        {
            // Register the tools.
            $(
                $cmd = $cmd.subcommand(
                    <$tool>::cli()
                    .name($name)
                    $(.alias($alias))*
                );
            )*

            // Parse args.
            let matches = $cmd.get_matches();
            $setup(&matches);
            let (subcommand_name, subcommand_matches) = matches
                .subcommand()
                .context("Could not determine subcommand")?;

            // Run the specific tool.
            match subcommand_name {
                $(
                    $name => {
                        let output = <$tool>::from_arg_matches(subcommand_matches)
                            .context("Could not initialize the tool")?
                            .execute()
                            .context("Could not execute tool")?;

                        Ok(output)
                    }
                )*
                _ => {
                    Err(anyhow!("Unknown subcommand"))
                }
            }
        }
    };
}

// Logs go to stderr, stdout carries the rendered output.
fn init_logging(matches: &ArgMatches) {
    let level = if matches.get_flag("verbose") {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let mut cli = clap::builder::Command::new("pageqr")
        .about("render QR code blocks linking to site pages")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log debug information to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        );

    let output: anyhow::Result<Option<Output>> = toolbox!(
        cli,
        init_logging,
        (tools::catalog::CatalogTool, "catalog",),
        (tools::expand::ExpandTool, "expand", "build"),
        (tools::qr::QRTool, "qr", "render"),
        (tools::resolve::ResolveTool, "resolve",)
    );
    let output = output.context("Could not run tool")?;

    match output {
        Some(Output::Text(text)) => {
            io::stdout()
                .write_all(text.as_bytes())
                .context("Could not write output to stdout")?;
        }
        Some(Output::JsonValue(value)) => {
            print!(
                "{}",
                serde_json::to_string_pretty(&value).context("Could not serialize result")?
            );
        }
        None => {}
    }

    Ok(())
}
