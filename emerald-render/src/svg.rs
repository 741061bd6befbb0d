/*!
# SVG Writer

Serializes a [`Scene`] into a standalone SVG document. Output depends only on
the scene, so identical inputs give byte-identical files.
*/

use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::ExportError;
use crate::geometry::{build_scene, ExportData, Layer, Primitive, RenderStyle, Scene, Stroke, TextAnchor, TextLabel};

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const PLOT_CLIP_ID: &str = "plot-clip";

/// Build the scene for `data` and serialize it.
pub fn export_svg(data: &ExportData, style: &RenderStyle) -> Result<String, ExportError> {
    let scene = build_scene(data, style);
    render_svg(&scene, style)
}

/// Serialize `scene`. Fails when the scene has no drawable area or the
/// serialized document comes out empty.
pub fn render_svg(scene: &Scene, style: &RenderStyle) -> Result<String, ExportError> {
    if !(scene.width.is_finite() && scene.height.is_finite() && scene.width > 0.0 && scene.height > 0.0) {
        return Err(ExportError::precondition(format!(
            "Plot has no drawable area ({}x{})",
            scene.width, scene.height
        )));
    }

    let mut svg = SvgBuilder::new(scene.width, scene.height, &style.font_family);
    svg.add_plot_clip(scene);
    for layer in &scene.layers {
        svg.add_layer(layer);
    }

    let document = svg.finish();
    if document.trim().is_empty() {
        return Err(ExportError::serialization("SVG serialization produced empty content"));
    }
    Ok(document)
}

pub fn write_svg_file<P: AsRef<Path>>(path: P, document: &str) -> Result<(), ExportError> {
    let mut file = File::create(path)?;
    file.write_all(document.as_bytes())?;
    Ok(())
}

struct SvgBuilder {
    width: f64,
    height: f64,
    font_family: String,
    defs: Vec<String>,
    elements: Vec<String>,
}

impl SvgBuilder {
    fn new(width: f64, height: f64, font_family: &str) -> Self {
        Self {
            width,
            height,
            font_family: font_family.to_string(),
            defs: Vec::new(),
            elements: Vec::new(),
        }
    }

    fn add_plot_clip(&mut self, scene: &Scene) {
        let plot = &scene.plot;
        self.defs.push(format!(
            r#"<clipPath id="{}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath>"#,
            PLOT_CLIP_ID,
            num(plot.left),
            num(plot.top),
            num(plot.width()),
            num(plot.height())
        ));
    }

    fn add_layer(&mut self, layer: &Layer) {
        self.elements.push(format!(r#"<g class="{}">"#, layer.kind.class_name()));
        if !layer.clipped.is_empty() {
            self.elements.push(format!(r#"  <g clip-path="url(#{})">"#, PLOT_CLIP_ID));
            for p in &layer.clipped {
                let element = self.primitive(p);
                self.elements.push(format!("    {}", element));
            }
            self.elements.push("  </g>".to_string());
        }
        for p in &layer.unclipped {
            let element = self.primitive(p);
            self.elements.push(format!("  {}", element));
        }
        self.elements.push("</g>".to_string());
    }

    fn primitive(&self, primitive: &Primitive) -> String {
        match primitive {
            Primitive::Rect {
                x,
                y,
                width,
                height,
                fill,
                fill_opacity,
                stroke,
            } => {
                let fill_attr = match fill {
                    Some(color) if *fill_opacity < 1.0 => {
                        format!(r#"fill="{}" fill-opacity="{}""#, escape_xml(color), num(*fill_opacity))
                    }
                    Some(color) => format!(r#"fill="{}""#, escape_xml(color)),
                    None => r#"fill="none""#.to_string(),
                };
                let stroke_attr = stroke.as_ref().map(stroke_attrs).unwrap_or_default();
                format!(
                    r#"<rect x="{}" y="{}" width="{}" height="{}" {}{}/>"#,
                    num(*x),
                    num(*y),
                    num(width.max(0.0)),
                    num(height.max(0.0)),
                    fill_attr,
                    stroke_attr
                )
            }
            Primitive::Line { x1, y1, x2, y2, stroke } => format!(
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
                num(*x1),
                num(*y1),
                num(*x2),
                num(*y2),
                stroke_attrs(stroke)
            ),
            Primitive::Circle { cx, cy, r, fill } => format!(
                r#"<circle cx="{}" cy="{}" r="{}" fill="{}"/>"#,
                num(*cx),
                num(*cy),
                num(*r),
                escape_xml(fill)
            ),
            Primitive::Text(label) => self.text(label),
        }
    }

    fn text(&self, label: &TextLabel) -> String {
        let anchor = match label.anchor {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        };
        let mut attrs = format!(
            r#"x="{}" y="{}" font-family="{}" font-size="{}px" text-anchor="{}" fill="{}""#,
            num(label.x),
            num(label.y),
            escape_xml(&self.font_family),
            num(label.font_size),
            anchor,
            escape_xml(&label.fill)
        );
        if label.bold {
            attrs.push_str(r#" font-weight="bold""#);
        }
        if label.middle_baseline {
            attrs.push_str(r#" dominant-baseline="middle""#);
        }
        if let Some(angle) = label.rotate {
            let _ = write!(attrs, r#" transform="rotate({} {} {})""#, num(angle), num(label.x), num(label.y));
        }
        format!("<text {}>{}</text>", attrs, escape_xml(&label.content))
    }

    fn finish(self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(&format!(
            "<svg width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" xmlns=\"{}\">\n",
            num(self.width),
            num(self.height),
            num(self.width),
            num(self.height),
            SVG_NAMESPACE
        ));
        if !self.defs.is_empty() {
            out.push_str("  <defs>\n");
            for def in &self.defs {
                out.push_str(&format!("    {}\n", def));
            }
            out.push_str("  </defs>\n");
        }
        for element in &self.elements {
            out.push_str(&format!("  {}\n", element));
        }
        out.push_str("</svg>\n");
        out
    }
}

fn stroke_attrs(stroke: &Stroke) -> String {
    let mut attrs = format!(
        r#" stroke="{}" stroke-width="{}""#,
        escape_xml(&stroke.color),
        num(stroke.width)
    );
    if stroke.opacity < 1.0 {
        let _ = write!(attrs, r#" stroke-opacity="{}""#, num(stroke.opacity));
    }
    if let Some((on, off)) = stroke.dash {
        let _ = write!(attrs, r#" stroke-dasharray="{},{}""#, num(on), num(off));
    }
    attrs
}

/// Fixed two-decimal formatting with trailing zeros trimmed.
fn num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(1.256), "1.26");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(f64::NAN), "0");
        assert_eq!(num(120.0), "120");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_xml(r#"a<b & "c""#), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_standalone_document() {
        let svg = export_svg(&ExportData::default(), &RenderStyle::default()).unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
        assert!(svg.contains(r#"<g class="layer-background">"#));
        assert!(!svg.contains("href"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_zero_area_is_rejected() {
        let data = ExportData {
            width: 0.0,
            ..Default::default()
        };
        let err = export_svg(&data, &RenderStyle::default()).unwrap_err();
        assert!(matches!(err, ExportError::Precondition { .. }));
    }
}
