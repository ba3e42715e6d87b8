use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode, types::QrError};
use serde_json::Value;

use crate::context;
use crate::error::{Error, Result};

/// Context path holding the site wide base url.
pub const BASE_URL_PATH: &str = "site.url";

/// Width and height of the emitted image in pixels.
pub const IMAGE_SIZE: u32 = 300;

/// The `qr` tag. Renders a QR code pointing at the absolute url of a page.
///
/// The tag takes one argument, the context key holding the page relative
/// path, e.g. `{% qr page.url %}`. The absolute url is the value of
/// `site.url` followed by the page path, concatenated as is.
#[derive(Debug, Clone)]
pub struct QrTag {
    key: String,
}

impl QrTag {
    pub fn new(markup: &str) -> Self {
        QrTag {
            key: markup.trim().to_string(),
        }
    }

    pub fn resolve_url(&self, ctx: &Value) -> Result<String> {
        let base = context::lookup_path(ctx, BASE_URL_PATH)?;
        let base = context::stringify(base, BASE_URL_PATH)?;

        // Keys are literal first. A dotted key that is not present as is
        // gets walked like a path.
        let page = match context::lookup(ctx, &self.key) {
            Some(value) => value,
            None if self.key.contains('.') => context::lookup_path(ctx, &self.key)?,
            None => {
                return Err(Error::MissingKey {
                    path: self.key.clone(),
                    segment: self.key.clone(),
                });
            }
        };
        let page = context::stringify(page, &self.key)?;

        let resolved = format!("{base}{page}");
        if let Err(err) = url::Url::parse(&resolved) {
            tracing::warn!("'{}' is not an absolute url: {}", resolved, err);
        }

        Ok(resolved)
    }

    pub fn render(&self, ctx: &Value) -> Result<String> {
        let url = self.resolve_url(ctx)?;
        tracing::debug!("rendering qr code for {}", url);

        let code = encode(&url)?;
        let image = rasterize(&code)?;
        let src = data_url(&image)?;

        Ok(fragment(&src, &url))
    }
}

pub fn encode(text: &str) -> Result<QrCode> {
    QrCode::with_error_correction_level(text, EcLevel::M).map_err(|err| match err {
        QrError::DataTooLong => Error::CapacityExceeded { len: text.len() },
        other => Error::Encoding(other),
    })
}

// Render with a quiet zone at whole pixels per module and centre that on a
// white canvas of the final size. Every module keeps the same width.
pub fn rasterize(code: &QrCode) -> Result<GrayImage> {
    let image = code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .max_dimensions(IMAGE_SIZE, IMAGE_SIZE)
        .build();

    if image.width() == 0 || image.height() == 0 {
        return Err(Error::Rasterization(format!(
            "symbol of width {} produced an empty image",
            code.width()
        )));
    }

    let mut canvas = GrayImage::from_pixel(IMAGE_SIZE, IMAGE_SIZE, Luma([255]));
    let x = (IMAGE_SIZE.saturating_sub(image.width()) / 2) as i64;
    let y = (IMAGE_SIZE.saturating_sub(image.height()) / 2) as i64;
    image::imageops::overlay(&mut canvas, &image, x, y);

    Ok(canvas)
}

pub fn data_url(image: &GrayImage) -> Result<String> {
    let mut bytes: Vec<u8> = Vec::new();
    DynamicImage::ImageLuma8(image.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

    Ok(format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(bytes)
    ))
}

pub fn fragment(src: &str, url: &str) -> String {
    format!(
        "<div class=\"qrcode\">\n  <img src=\"{}\" alt=\"{}\">\n</div>",
        src,
        html_escape::encode_double_quoted_attribute(url),
    )
}
