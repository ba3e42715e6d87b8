use crate::args::{ContextArgs, FileInput};
use crate::template::{Registry, Template};
use crate::tool::{Output, Tool};
use anyhow::Context;
use clap::{Command, CommandFactory, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "expand",
    about = "Expand {% qr ... %} tags in a template"
)]
pub struct ExpandTool {
    /// Template to expand. Use "-" to read from stdin
    template: FileInput,

    #[command(flatten)]
    context: ContextArgs,
}

impl Tool for ExpandTool {
    fn cli() -> Command {
        ExpandTool::command()
    }

    fn execute(&self) -> anyhow::Result<Option<Output>> {
        let ctx = self.context.load().context("Could not load context")?;

        let template =
            Template::parse(self.template.as_ref()).context("Could not parse template")?;
        let registry = Registry::with_defaults();
        tracing::debug!(
            "expanding with tags: {}",
            registry.names().collect::<Vec<_>>().join(", ")
        );

        let output = template
            .render(&registry, &ctx)
            .context("Could not render template")?;

        Ok(Some(Output::Text(output)))
    }
}
