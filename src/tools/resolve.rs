use crate::args::ContextArgs;
use crate::qr::QrTag;
use crate::tool::{Output, Tool};
use anyhow::Context;
use clap::{Command, CommandFactory, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "resolve",
    about = "Print the absolute url a QR code would encode"
)]
pub struct ResolveTool {
    /// Context key holding the page relative path (e.g. page.url)
    key: String,

    #[command(flatten)]
    context: ContextArgs,
}

impl Tool for ResolveTool {
    fn cli() -> Command {
        ResolveTool::command()
    }

    fn execute(&self) -> anyhow::Result<Option<Output>> {
        let ctx = self.context.load().context("Could not load context")?;

        let url = QrTag::new(&self.key)
            .resolve_url(&ctx)
            .context("Could not resolve url")?;

        Ok(Some(Output::JsonValue(serde_json::json!(url))))
    }
}
