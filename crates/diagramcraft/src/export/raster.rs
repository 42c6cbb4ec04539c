//! SVG to PNG conversion with `resvg`.

use std::sync::{Arc, LazyLock};

use image::{ExtendedColorType, ImageEncoder, codecs::png::PngEncoder};
use log::debug;
use resvg::{tiny_skia, usvg};

use crate::export::ExportError;

/// System fonts, loaded once for every conversion.
static FONTDB: LazyLock<Arc<fontdb::Database>> = LazyLock::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    debug!(faces = db.len(); "Loaded system fonts");
    Arc::new(db)
});

/// Target canvas settings.
#[derive(Debug, Clone, Copy)]
pub(super) struct Canvas {
    pub scale: f32,
    pub background: [u8; 4],
    pub max_dimension: u32,
}

pub(super) fn svg_to_png(svg: &str, canvas: &Canvas) -> Result<Vec<u8>, ExportError> {
    let svg = sanitize_font_family(svg);

    let options = usvg::Options {
        fontdb: FONTDB.clone(),
        ..Default::default()
    };
    let tree =
        usvg::Tree::from_str(&svg, &options).map_err(|err| ExportError::InvalidSvg(err.to_string()))?;

    let size = tree.size();
    let width = (f64::from(size.width()) * f64::from(canvas.scale)).ceil() as u64;
    let height = (f64::from(size.height()) * f64::from(canvas.scale)).ceil() as u64;
    let max = u64::from(canvas.max_dimension);
    if width == 0 || height == 0 || width > max || height > max {
        return Err(ExportError::CanvasSize {
            width,
            height,
            max: canvas.max_dimension,
        });
    }
    let (width, height) = (width as u32, height as u32);

    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or(ExportError::CanvasSize {
        width: u64::from(width),
        height: u64::from(height),
        max: canvas.max_dimension,
    })?;
    let [r, g, b, _] = canvas.background;
    pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, 255));

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(canvas.scale, canvas.scale),
        &mut pixmap.as_mut(),
    );

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(pixmap.data(), width, height, ExtendedColorType::Rgba8)
        .map_err(|err| ExportError::Encode(err.to_string()))?;

    debug!(width = width, height = height, bytes = png.len(); "SVG rasterized");
    Ok(png)
}

/// Replace unescaped inner quotes in `font-family="..."` values with `'`.
///
/// Some engines emit `font-family="Inter, "Segoe UI", sans-serif"`, which is
/// not well-formed XML.
fn sanitize_font_family(svg: &str) -> String {
    const ATTRIBUTE: &str = "font-family=\"";

    let mut result = String::with_capacity(svg.len());
    let mut rest = svg;
    while let Some(start) = rest.find(ATTRIBUTE) {
        let value_start = start + ATTRIBUTE.len();
        result.push_str(&rest[..value_start]);
        rest = &rest[value_start..];

        let mut chars = rest.char_indices().peekable();
        let mut consumed = rest.len();
        while let Some((index, c)) = chars.next() {
            if c != '"' {
                result.push(c);
                continue;
            }
            match chars.peek() {
                Some(&(_, ' ' | '/' | '>')) | None => {
                    result.push('"');
                    consumed = index + 1;
                    break;
                }
                Some(_) => result.push('\''),
            }
        }
        rest = &rest[consumed..];
    }
    result.push_str(rest);
    result
}
