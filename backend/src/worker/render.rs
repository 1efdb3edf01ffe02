//! The QR renderer boundary.
//!
//! The engine only sees [`QrRenderer`]: give it a payload and the job style,
//! get back an SVG document or a base64-encoded raster image. The bundled
//! [`QrCodeRenderer`] takes the module matrix from the `qrcode` crate and
//! draws it itself so that margin, size and colors follow the job options.

use crate::error::RenderError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::model::batch::{ErrorCorrection, OutputFormat, RenderOptions};
use image::{Rgba, RgbaImage};
use png::{BitDepth as PngBitDepth, ColorType as PngColorType, Encoder as PngEncoder};
use qrcode::{EcLevel, QrCode};

/// Largest raster edge the bundled renderer will draw.
pub const MAX_IMAGE_PX: u64 = 8192;

/// A rendered QR symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedArtifact {
    /// A complete SVG document.
    Svg(String),
    /// Raster image bytes, base64 encoded. May carry a `data:...;base64,` prefix.
    RasterBase64(String),
}

pub trait QrRenderer: Send + Sync {
    fn render(
        &self,
        payload: &str,
        format: OutputFormat,
        options: &RenderOptions,
    ) -> Result<RenderedArtifact, RenderError>;
}

/// Renderer backed by the `qrcode` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrCodeRenderer;

impl QrRenderer for QrCodeRenderer {
    fn render(
        &self,
        payload: &str,
        format: OutputFormat,
        options: &RenderOptions,
    ) -> Result<RenderedArtifact, RenderError> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), ec_level(options.error_correction))?;
        let layout = Layout::new(code.width(), options)?;
        let modules = code.to_colors();
        let foreground = parse_color(&options.foreground)?;
        let background = parse_color(&options.background)?;

        match format {
            OutputFormat::Svg => Ok(RenderedArtifact::Svg(draw_svg(
                &modules, &layout, foreground, background,
            ))),
            OutputFormat::Png => {
                let png = draw_png(&modules, &layout, foreground, background)?;
                Ok(RenderedArtifact::RasterBase64(BASE64.encode(png)))
            }
        }
    }
}

fn ec_level(level: ErrorCorrection) -> EcLevel {
    match level {
        ErrorCorrection::L => EcLevel::L,
        ErrorCorrection::M => EcLevel::M,
        ErrorCorrection::Q => EcLevel::Q,
        ErrorCorrection::H => EcLevel::H,
    }
}

/// Symbol geometry: module count, quiet zone and pixel scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    modules: usize,
    margin: usize,
    scale: u32,
}

impl Layout {
    fn new(modules: usize, options: &RenderOptions) -> Result<Self, RenderError> {
        let margin = u64::from(options.margin);
        let span = margin
            .checked_mul(2)
            .and_then(|quiet| quiet.checked_add(modules as u64))
            .unwrap_or(u64::MAX);
        if span > MAX_IMAGE_PX {
            return Err(RenderError::TooLarge(span));
        }
        let scale = (u64::from(options.size) / span.max(1)).max(1);
        let edge = span * scale;
        if edge > MAX_IMAGE_PX {
            return Err(RenderError::TooLarge(edge));
        }
        // Both values are bounded by MAX_IMAGE_PX from here on.
        Ok(Layout {
            modules,
            margin: margin as usize,
            scale: scale as u32,
        })
    }

    /// Modules per side including the quiet zone.
    fn span(&self) -> usize {
        self.modules + 2 * self.margin
    }

    fn pixels(&self) -> u32 {
        self.span() as u32 * self.scale
    }
}

/// Parses `#RGB`, `#RRGGBB` or `#RRGGBBAA` (the `#` is optional).
pub fn parse_color(value: &str) -> Result<[u8; 4], RenderError> {
    let invalid = || RenderError::InvalidColor(value.to_string());
    let hex = value.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => hex.to_string(),
        _ => return Err(invalid()),
    };
    let mut rgba = [0, 0, 0, 255];
    for (i, channel) in rgba.iter_mut().enumerate().take(expanded.len() / 2) {
        *channel = u8::from_str_radix(&expanded[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
    }
    Ok(rgba)
}

fn svg_paint(attribute: &str, [r, g, b, a]: [u8; 4]) -> String {
    let mut paint = format!("{attribute}=\"#{r:02x}{g:02x}{b:02x}\"");
    if a < 255 {
        paint.push_str(&format!(" {attribute}-opacity=\"{:.3}\"", a as f64 / 255.0));
    }
    paint
}

fn draw_svg(modules: &[qrcode::Color], layout: &Layout, foreground: [u8; 4], background: [u8; 4]) -> String {
    let mut path = String::new();
    for y in 0..layout.modules {
        let row = &modules[y * layout.modules..(y + 1) * layout.modules];
        let mut x = 0;
        while x < layout.modules {
            if row[x] != qrcode::Color::Dark {
                x += 1;
                continue;
            }
            let start = x;
            while x < layout.modules && row[x] == qrcode::Color::Dark {
                x += 1;
            }
            let run = x - start;
            path.push_str(&format!(
                "M{} {}h{}v1h-{}z",
                start + layout.margin,
                y + layout.margin,
                run,
                run
            ));
        }
    }

    let span = layout.span();
    let pixels = layout.pixels();
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{pixels}\" height=\"{pixels}\" \
         viewBox=\"0 0 {span} {span}\" shape-rendering=\"crispEdges\">\
         <rect width=\"{span}\" height=\"{span}\" {}/>\
         <path {} d=\"{path}\"/></svg>",
        svg_paint("fill", background),
        svg_paint("fill", foreground),
    )
}

fn draw_png(
    modules: &[qrcode::Color],
    layout: &Layout,
    foreground: [u8; 4],
    background: [u8; 4],
) -> Result<Vec<u8>, RenderError> {
    let pixels = layout.pixels();
    let scale = layout.scale;
    let mut image = RgbaImage::from_pixel(pixels, pixels, Rgba(background));

    for (i, module) in modules.iter().enumerate() {
        if *module != qrcode::Color::Dark {
            continue;
        }
        let x0 = (i % layout.modules + layout.margin) as u32 * scale;
        let y0 = (i / layout.modules + layout.margin) as u32 * scale;
        for dy in 0..scale {
            for dx in 0..scale {
                image.put_pixel(x0 + dx, y0 + dy, Rgba(foreground));
            }
        }
    }

    let mut buffer = Vec::new();
    {
        let mut encoder = PngEncoder::new(&mut buffer, pixels, pixels);
        encoder.set_color(PngColorType::Rgba);
        encoder.set_depth(PngBitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.as_raw())?;
        writer.finish()?;
    }
    Ok(buffer)
}
