// A subcommand of the pageqr binary.
pub trait Tool {
    // The clap::Command for this tool, mounted as a subcommand by main.
    fn cli() -> clap::Command;

    // Run the tool with the arguments parsed from cli above.
    fn execute(&self) -> anyhow::Result<Option<Output>>;
}

// What a tool hands back to main for printing.
#[derive(Debug)]
pub enum Output {
    Text(String),
    JsonValue(serde_json::Value),
}
