//! Plain-text snapshot rendering for one-shot invocations.

use crate::health::{HealthSnapshot, NodeStatus};

const HEADERS: [&str; 6] = ["Provider", "Node", "Status", "Height", "Tier", "Latency"];

/// Render a snapshot as an aligned text table with a title line.
pub fn format_snapshot(snapshot: &HealthSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&snapshot.label);
    out.push('\n');

    if snapshot.rows.is_empty() {
        out.push_str("no nodes reported\n");
        return out;
    }

    let cells: Vec<[String; 6]> = snapshot.rows.iter().map(row_cells).collect();

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }

    push_row(&mut out, &HEADERS.map(String::from), &widths);
    for row in &cells {
        push_row(&mut out, row, &widths);
    }
    out
}

fn row_cells(row: &crate::health::GroupedHealthRow) -> [String; 6] {
    let (height, tier, latency) = match row.status {
        NodeStatus::Failure => ("NA".to_string(), "-".to_string(), "NA".to_string()),
        NodeStatus::Success => (
            row.height.to_string(),
            row.tier.map(|t| t.symbol().to_string()).unwrap_or_default(),
            format!("{:.3} ms", row.latency_ms),
        ),
    };
    [
        row.provider.clone(),
        format!("{} #{}", row.region, row.node_index),
        row.status.symbol().to_string(),
        height,
        tier,
        latency,
    ]
}

fn push_row(out: &mut String, cells: &[String; 6], widths: &[usize]) {
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        // No trailing padding on the last column.
        if i < cells.len() - 1 {
            for _ in cell.len()..*width {
                out.push(' ');
            }
        }
    }
    out.push('\n');
}
