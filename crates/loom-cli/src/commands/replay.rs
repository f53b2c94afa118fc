use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use loom_core::{EditorSnapshot, EventId};
use loom_core::render::fmt_num;
use loom_core::snapshot::CurveView;

use crate::Format;
use crate::script::StepReport;

pub fn run(path: &Path, format: Format) -> Result<(), String> {
    let replay = super::replay_file(path)?;
    let snapshot = replay.session.snapshot();

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "steps": replay.reports,
                "snapshot": snapshot,
            });
            let text = serde_json::to_string_pretty(&out)
                .map_err(|e| format!("cannot serialize snapshot: {e}"))?;
            println!("{text}");
        }
        Format::Table => {
            print_steps(&replay.reports);
            print_tracks(&snapshot);
            print_curve(&snapshot.momentum);
            print_curve(&snapshot.tension);
            print_distributions(&snapshot);
        }
    }

    Ok(())
}

fn print_steps(reports: &[StepReport]) {
    let rejected = reports.iter().filter(|r| !r.applied).count();
    println!(
        "  {} steps, {} applied, {} ignored",
        reports.len(),
        reports.len() - rejected,
        rejected
    );
    for report in reports.iter().filter(|r| !r.applied) {
        println!(
            "  {} step {} ({}): {}",
            "ignored".yellow(),
            report.step,
            report.op,
            report.result
        );
    }
    println!();
}

fn print_tracks(snapshot: &EditorSnapshot) {
    let label_of = |id: EventId| {
        snapshot
            .event(id)
            .map(|e| e.label.clone())
            .unwrap_or_else(|| id.to_string())
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Track", "Event", "Position", "Connects to"]);

    for track in &snapshot.tracks {
        let header = format!("{} [{}]", track.label, track.color);
        if track.events.is_empty() {
            table.add_row(vec![header, "—".to_string(), String::new(), String::new()]);
            continue;
        }
        let mut events: Vec<_> = track.events.iter().collect();
        events.sort_by(|a, b| a.position.total_cmp(&b.position));
        for (i, event) in events.into_iter().enumerate() {
            let track_cell = if i == 0 { header.clone() } else { String::new() };
            let target = event
                .connection_target
                .map(&label_of)
                .unwrap_or_default();
            table.add_row(vec![
                track_cell,
                event.label.clone(),
                fmt_num(event.position),
                target,
            ]);
        }
    }

    println!("{table}");
    println!();
    println!("  {} tracks", snapshot.tracks.len());
    println!();
}

fn print_curve(curve: &CurveView) {
    println!(
        "  {} curve ({}–{})",
        curve.kind.to_string().bold(),
        fmt_num(curve.scale.min),
        fmt_num(curve.scale.max)
    );
    if curve.points.is_empty() {
        println!("  No points.");
        println!();
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Position", "Intensity", "Label", curve.kind.accent_name()]);
    for point in &curve.points {
        table.add_row(vec![
            fmt_num(point.position),
            fmt_num(point.intensity),
            point.label.clone().unwrap_or_default(),
            if point.accent { "yes" } else { "" }.to_string(),
        ]);
    }
    println!("{table}");
    println!();
}

fn print_distributions(snapshot: &EditorSnapshot) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Distribution", "Weights", "Total"]);
    for dist in &snapshot.distributions {
        let weights = dist
            .categories
            .iter()
            .map(|c| format!("{} {}%", c.key, fmt_num(c.weight)))
            .collect::<Vec<_>>()
            .join(", ");
        let total = format!("{}%", fmt_num(dist.total));
        let total = if dist.balanced {
            total
        } else {
            format!("{total} (off by {})", fmt_num(dist.total - 100.0))
        };
        table.add_row(vec![dist.kind.to_string(), weights, total]);
    }
    println!("{table}");
}
