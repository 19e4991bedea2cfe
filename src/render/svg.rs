//! Paints a [`Scene`] as a standalone SVG document.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::RenderError;
use crate::preview::markup::fmt_num;

use super::scene::{Scene, SceneShape, ScenePath, ShapeStyle};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const STROKE: &str = "#333";
const START_FILL: &str = "#90EE90";
const END_FILL: &str = "#FF6B6B";
const BOX_FILL: &str = "#87CEEB";
const EMPTY_MESSAGE: &str = "Nothing to display";

type SvgWriter = Writer<Vec<u8>>;

pub fn to_svg(scene: &Scene) -> Result<String, RenderError> {
    let mut w = Writer::new(Vec::new());

    let Some(viewport) = scene.viewport.filter(|_| !scene.is_empty()) else {
        let view_box = "0 0 400 200";
        start(&mut w, "svg", &[("xmlns", SVG_NS), ("viewBox", view_box)])?;
        text(
            &mut w,
            &[
                ("x", "50%"),
                ("y", "50%"),
                ("text-anchor", "middle"),
                ("font-size", "16"),
            ],
            EMPTY_MESSAGE,
        )?;
        end(&mut w, "svg")?;
        return Ok(String::from_utf8(w.into_inner())?);
    };

    let view_box = format!(
        "{} {} {} {}",
        fmt_num(viewport.x),
        fmt_num(viewport.y),
        fmt_num(viewport.width),
        fmt_num(viewport.height)
    );
    start(
        &mut w,
        "svg",
        &[
            ("xmlns", SVG_NS),
            ("width", "100%"),
            ("height", "100%"),
            ("viewBox", view_box.as_str()),
        ],
    )?;
    write_defs(&mut w)?;

    // Connections go first so shapes paint over their ends.
    for path in &scene.paths {
        write_path(&mut w, path)?;
    }
    for shape in &scene.shapes {
        write_shape(&mut w, shape)?;
    }

    end(&mut w, "svg")?;
    Ok(String::from_utf8(w.into_inner())?)
}

fn write_defs(w: &mut SvgWriter) -> Result<(), RenderError> {
    start(w, "defs", &[])?;
    start(
        w,
        "marker",
        &[
            ("id", "arrowhead"),
            ("markerWidth", "10"),
            ("markerHeight", "10"),
            ("refX", "9"),
            ("refY", "3"),
            ("orient", "auto"),
        ],
    )?;
    empty(w, "polygon", &[("points", "0 0, 10 3, 0 6"), ("fill", STROKE)])?;
    end(w, "marker")?;
    start(w, "style", &[])?;
    w.write_event(Event::Text(BytesText::new(
        "text { font-family: Arial, sans-serif; }",
    )))?;
    end(w, "style")?;
    end(w, "defs")
}

fn write_path(w: &mut SvgWriter, path: &ScenePath) -> Result<(), RenderError> {
    let mut points = path.points.iter();
    let Some(first) = points.next() else {
        return Ok(());
    };
    let mut d = format!("M {} {}", fmt_num(first.x), fmt_num(first.y));
    for p in points {
        d.push_str(&format!(" L {} {}", fmt_num(p.x), fmt_num(p.y)));
    }
    empty(
        w,
        "path",
        &[
            ("id", path.id.as_str()),
            ("d", d.as_str()),
            ("fill", "none"),
            ("stroke", STROKE),
            ("stroke-width", "2"),
            ("marker-end", "url(#arrowhead)"),
        ],
    )?;

    if let (Some(label), Some(anchor)) = (path.label.as_deref(), path.label_anchor()) {
        if !label.is_empty() {
            let (x, y) = (fmt_num(anchor.x), fmt_num(anchor.y - 6.0));
            text(
                w,
                &[
                    ("x", x.as_str()),
                    ("y", y.as_str()),
                    ("text-anchor", "middle"),
                    ("font-size", "11"),
                ],
                label,
            )?;
        }
    }
    Ok(())
}

fn write_shape(w: &mut SvgWriter, shape: &SceneShape) -> Result<(), RenderError> {
    let b = shape.bounds;
    let center = b.center();
    let (cx, cy) = (fmt_num(center.x), fmt_num(center.y));
    start(w, "g", &[("id", shape.id.as_str())])?;

    match shape.style() {
        style @ (ShapeStyle::StartCircle | ShapeStyle::EndCircle) => {
            let (fill, stroke_width) = if style == ShapeStyle::StartCircle {
                (START_FILL, "2")
            } else {
                (END_FILL, "3")
            };
            let r = fmt_num(b.width.min(b.height) / 2.0);
            empty(
                w,
                "circle",
                &[
                    ("cx", cx.as_str()),
                    ("cy", cy.as_str()),
                    ("r", r.as_str()),
                    ("fill", fill),
                    ("stroke", STROKE),
                    ("stroke-width", stroke_width),
                ],
            )?;
            let ty = fmt_num(b.bottom() + 15.0);
            text(
                w,
                &[
                    ("x", cx.as_str()),
                    ("y", ty.as_str()),
                    ("text-anchor", "middle"),
                    ("font-size", "12"),
                ],
                &shape.name,
            )?;
        }
        ShapeStyle::RoundedRect => {
            let (x, y) = (fmt_num(b.x), fmt_num(b.y));
            let (width, height) = (fmt_num(b.width), fmt_num(b.height));
            empty(
                w,
                "rect",
                &[
                    ("x", x.as_str()),
                    ("y", y.as_str()),
                    ("width", width.as_str()),
                    ("height", height.as_str()),
                    ("fill", BOX_FILL),
                    ("stroke", STROKE),
                    ("stroke-width", "2"),
                    ("rx", "8"),
                ],
            )?;
            let ty = fmt_num(center.y + 5.0);
            text(
                w,
                &[
                    ("x", cx.as_str()),
                    ("y", ty.as_str()),
                    ("text-anchor", "middle"),
                    ("font-size", "14"),
                ],
                &shape.name,
            )?;
        }
    }

    end(w, "g")
}

fn start(w: &mut SvgWriter, name: &str, attrs: &[(&str, &str)]) -> Result<(), RenderError> {
    w.write_event(Event::Start(
        BytesStart::new(name).with_attributes(attrs.iter().copied()),
    ))?;
    Ok(())
}

fn end(w: &mut SvgWriter, name: &str) -> Result<(), RenderError> {
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn empty(w: &mut SvgWriter, name: &str, attrs: &[(&str, &str)]) -> Result<(), RenderError> {
    w.write_event(Event::Empty(
        BytesStart::new(name).with_attributes(attrs.iter().copied()),
    ))?;
    Ok(())
}

fn text(w: &mut SvgWriter, attrs: &[(&str, &str)], content: &str) -> Result<(), RenderError> {
    start(w, "text", attrs)?;
    w.write_event(Event::Text(BytesText::new(content)))?;
    end(w, "text")
}
