use crate::args::ContextArgs;
use crate::qr::QrTag;
use crate::tool::{Output, Tool};
use anyhow::{Context, Result};
use clap::{Command, CommandFactory, Parser};

#[derive(Parser, Debug)]
#[command(name = "qr", about = "Render the QR code block for a single page")]
pub struct QRTool {
    /// Context key holding the page relative path (e.g. page.url)
    key: String,

    #[command(flatten)]
    context: ContextArgs,
}

impl Tool for QRTool {
    fn cli() -> Command {
        QRTool::command()
    }

    fn execute(&self) -> Result<Option<Output>> {
        let ctx = self.context.load().context("Could not load context")?;

        let fragment = QrTag::new(&self.key)
            .render(&ctx)
            .context("Failed to render QR code")?;

        Ok(Some(Output::Text(fragment)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{Assignment, FileInput};
    use crate::qr::tests::{decode_fragment_image, scan};

    fn set(path: &str, value: &str) -> Assignment {
        Assignment(path.to_string(), value.to_string())
    }

    #[test]
    fn test_render_from_assignments() {
        let tool = QRTool {
            key: "page.url".to_string(),
            context: ContextArgs {
                context: None,
                set: vec![
                    set("site.url", "https://example.com"),
                    set("page.url", "/posts/1"),
                ],
            },
        };
        let result = tool.execute().unwrap().unwrap();

        let Output::Text(fragment) = result else {
            unreachable!()
        };
        assert!(fragment.contains("alt=\"https://example.com/posts/1\""));
        assert_eq!(
            scan(&decode_fragment_image(&fragment)),
            "https://example.com/posts/1"
        );
    }

    #[test]
    fn test_render_from_context_file() {
        let tool = QRTool {
            key: " url ".to_string(),
            context: ContextArgs {
                context: Some(FileInput(
                    r#"{"site": {"url": "https://x.io"}, "url": "/about/"}"#.to_string(),
                )),
                set: vec![],
            },
        };
        let result = tool.execute().unwrap().unwrap();

        let Output::Text(fragment) = result else {
            unreachable!()
        };
        assert!(fragment.contains("alt=\"https://x.io/about/\""));
    }

    #[test]
    fn test_render_missing_base_url() {
        let tool = QRTool {
            key: "page.url".to_string(),
            context: ContextArgs {
                context: None,
                set: vec![set("page.url", "/posts/1")],
            },
        };
        let err = tool.execute().unwrap_err();

        assert!(err.to_string().contains("Failed to render QR code"));
        assert!(format!("{err:#}").contains("site.url"));
    }
}
