use std::fmt::{self, Write as _};
use std::path::Path;

use loom_core::render::{
    self, AxisLabel, fmt_num, intensity_axis, lane_y, position_axis, svg_polyline_path,
};
use loom_core::{CurveKind, EditorSession, SurfaceRect};

const MARGIN: f64 = 40.0;
const MARKER_RADIUS: f64 = 5.0;

pub fn run(path: &Path, width: f64, height: f64, output: Option<&Path>) -> Result<(), String> {
    if !(width.is_finite() && height.is_finite()) || width <= 2.0 * MARGIN || height <= 4.0 * MARGIN
    {
        return Err(format!(
            "drawing must be larger than {}x{}",
            2.0 * MARGIN,
            4.0 * MARGIN
        ));
    }

    let replay = super::replay_file(path)?;
    let svg = draw(&replay.session, width, height)
        .map_err(|e| format!("cannot draw {}: {e}", path.display()))?;

    match output {
        Some(out) => {
            std::fs::write(out, &svg)
                .map_err(|e| format!("cannot write {}: {e}", out.display()))?;
            eprintln!("  Wrote {}", out.display());
        }
        None => print!("{svg}"),
    }
    Ok(())
}

/// Timeline lanes in the top half, both curves sharing the bottom half.
fn draw(session: &EditorSession, width: f64, height: f64) -> Result<String, fmt::Error> {
    let panel_height = height / 2.0 - 1.5 * MARGIN;
    let timeline = SurfaceRect::new(MARGIN, MARGIN, width - 2.0 * MARGIN, panel_height);
    let curves = SurfaceRect::new(
        MARGIN,
        height / 2.0 + MARGIN / 2.0,
        width - 2.0 * MARGIN,
        panel_height,
    );

    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = fmt_num(width),
        h = fmt_num(height),
    )?;

    let graph = session.graph();
    for (lane, track) in graph.tracks().iter().enumerate() {
        let y = fmt_num(lane_y(lane, graph.track_count(), timeline));
        writeln!(
            svg,
            r#"  <line class="lane" x1="{}" y1="{y}" x2="{}" y2="{y}" stroke="{}"/>"#,
            fmt_num(timeline.left),
            fmt_num(timeline.right()),
            escape(&track.color),
        )?;
        writeln!(
            svg,
            r#"  <text class="lane-label" x="4" y="{y}">{}</text>"#,
            escape(&track.label),
        )?;
    }

    for connector in render::connectors(graph, timeline) {
        writeln!(
            svg,
            r#"  <path class="connector" d="{}" fill="none"/>"#,
            connector.svg_path()
        )?;
    }
    for marker in render::event_markers(graph, timeline) {
        writeln!(
            svg,
            r#"  <circle class="event" cx="{}" cy="{}" r="{}" fill="{}"><title>{}</title></circle>"#,
            fmt_num(marker.at.x),
            fmt_num(marker.at.y),
            fmt_num(MARKER_RADIUS),
            escape(&marker.color),
            escape(&marker.label),
        )?;
    }

    for kind in [CurveKind::Momentum, CurveKind::Tension] {
        let curve = session.curve(kind);
        writeln!(
            svg,
            r#"  <path class="curve {kind}" d="{}" fill="none"/>"#,
            svg_polyline_path(&render::curve_polyline(curve, curves)),
        )?;
        for marker in render::curve_markers(curve, curves) {
            let class = if marker.accent { "point accent" } else { "point" };
            writeln!(
                svg,
                r#"  <circle class="{class} {kind}" cx="{}" cy="{}" r="{}"/>"#,
                fmt_num(marker.at.x),
                fmt_num(marker.at.y),
                fmt_num(MARKER_RADIUS),
            )?;
        }
    }

    write_axis(&mut svg, "x-axis", &position_axis(curves, 25.0))?;
    write_axis(
        &mut svg,
        "y-axis",
        &intensity_axis(curves, session.curve(CurveKind::Momentum).scale()),
    )?;

    svg.push_str("</svg>\n");
    Ok(svg)
}

fn write_axis(svg: &mut impl fmt::Write, class: &str, labels: &[AxisLabel]) -> fmt::Result {
    for label in labels {
        writeln!(
            svg,
            r#"  <text class="{class}" x="{}" y="{}">{}</text>"#,
            fmt_num(label.at.x),
            fmt_num(label.at.y),
            escape(&label.text),
        )?;
    }
    Ok(())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<Ana & "Bo">"#), "&lt;Ana &amp; &quot;Bo&quot;&gt;");
    }

    #[test]
    fn draws_every_element() {
        let mut session = EditorSession::default();
        let first = session.graph().tracks()[0].id;
        let second = session.graph().tracks()[1].id;
        let a = session.add_event(first, 10.0, "A").unwrap();
        let b = session.add_event(second, 60.0, "B").unwrap();
        session.connect(a, b).unwrap();
        session
            .add_point(CurveKind::Tension, 50.0, 8.0, None)
            .unwrap();

        let svg = draw(&session, 960.0, 540.0).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>\n"));
        assert_eq!(svg.matches(r#"class="lane""#).count(), 2);
        assert_eq!(svg.matches(r#"class="event""#).count(), 2);
        assert_eq!(svg.matches(r#"class="connector""#).count(), 1);
        assert!(svg.contains(r#"class="point tension""#));
        assert!(svg.contains(">100%</text>"));
    }
}
