use winsync_core::{Arrangement, WindowRecord};

/// Print a formatted table of arrangements
pub fn print_arrangements_table(arrangements: &[Arrangement], device_id: &str) {
    print!("{}", format_arrangements_table(arrangements, device_id));
    println!("\nTotal: {} arrangement(s)", arrangements.len());
}

/// Print a formatted table of the windows in one arrangement
pub fn print_windows_table(windows: &[WindowRecord]) {
    print!("{}", format_windows_table(windows));
    println!("\nTotal: {} window(s)", windows.len());
}

fn format_arrangements_table(arrangements: &[Arrangement], device_id: &str) -> String {
    let rows: Vec<Vec<String>> = arrangements
        .iter()
        .map(|a| {
            let origin = if a.is_from_device(device_id) {
                "this device".to_string()
            } else {
                a.origin_device().to_string()
            };
            let tags = if a.tags().is_empty() {
                "-".to_string()
            } else {
                a.tags().join(", ")
            };
            vec![
                a.name().to_string(),
                short_id(&a.id().to_string()),
                a.window_count().to_string(),
                tags,
                origin,
                a.updated_at().format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();

    let widths = [
        column_width(&rows, 0, 4, 30),
        8,
        7,
        column_width(&rows, 3, 4, 24),
        column_width(&rows, 4, 6, 16),
        16,
    ];
    render(
        &["Name", "ID", "Windows", "Tags", "Origin", "Updated"],
        &widths,
        &rows,
    )
}

fn format_windows_table(windows: &[WindowRecord]) -> String {
    let rows: Vec<Vec<String>> = windows
        .iter()
        .map(|w| {
            let title = if w.window_title.is_empty() {
                "(untitled)".to_string()
            } else {
                w.window_title.clone()
            };
            let state = if w.is_full_screen {
                "Full screen"
            } else if w.is_minimized {
                "Minimized"
            } else {
                "Visible"
            };
            vec![
                w.app_display_name.clone(),
                title,
                format!("{}x{}", w.frame.width, w.frame.height),
                format!("x:{} y:{}", w.frame.x, w.frame.y),
                state.to_string(),
            ]
        })
        .collect();

    let widths = [
        column_width(&rows, 0, 3, 20),
        column_width(&rows, 1, 5, 40),
        column_width(&rows, 2, 4, 11),
        column_width(&rows, 3, 8, 15),
        11,
    ];
    render(&["App", "Title", "Size", "Position", "State"], &widths, &rows)
}

/// Widest cell in `column`, clamped to `[min, max]`.
fn column_width(rows: &[Vec<String>], column: usize, min: usize, max: usize) -> usize {
    rows.iter()
        .map(|row| row[column].chars().count())
        .max()
        .unwrap_or(min)
        .clamp(min, max)
}

fn render(headers: &[&str], widths: &[usize], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    out.push_str(&border('┌', '┬', '┐', widths));
    out.push_str(&line(
        &headers.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
        widths,
    ));
    out.push_str(&border('├', '┼', '┤', widths));
    for row in rows {
        out.push_str(&line(row, widths));
    }
    out.push_str(&border('└', '┴', '┘', widths));
    out
}

fn border(left: char, mid: char, right: char, widths: &[usize]) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}\n", segments.join(&mid.to_string()))
}

fn line(cells: &[String], widths: &[usize]) -> String {
    let cells: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!(" {:<width$} ", truncate(cell, width), width = width))
        .collect();
    format!("│{}│\n", cells.join("│"))
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Truncate a string to at most `max_chars` characters, marking the cut with "...".
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        s.chars().take(max_chars).collect()
    } else {
        let kept: String = s.chars().take(max_chars - 3).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winsync_core::Frame;
    use winsync_core::testing::{arrangement, window_record};

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Safari", 10), "Safari");
        assert_eq!(truncate("A very long window title", 10), "A very ...");
        assert_eq!(truncate("abcdef", 3), "abc");
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        assert_eq!(truncate("Écran partagé", 13), "Écran partagé");
        assert_eq!(truncate("Écran partagé", 8), "Écran...");
    }

    #[test]
    fn test_arrangements_table_rows() {
        let windows = vec![window_record(
            "com.apple.Safari",
            "Docs",
            Frame::new(0.0, 25.0, 1200.0, 800.0),
        )];
        let local = arrangement("Work", "device-a", windows.clone());
        let remote = arrangement("Home", "device-b", windows);

        let table = format_arrangements_table(&[local.clone(), remote], "device-a");

        let lines: Vec<&str> = table.lines().collect();
        // border, header, separator, two rows, border
        assert_eq!(lines.len(), 6);
        assert!(lines[1].contains("Name"));
        assert!(lines[3].contains("Work"));
        assert!(lines[3].contains("this device"));
        assert!(lines[3].contains(&local.id().to_string()[..8]));
        assert!(lines[4].contains("device-b"));
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]));
    }

    #[test]
    fn test_windows_table_marks_untitled_windows() {
        let windows = vec![window_record(
            "com.apple.Terminal",
            "",
            Frame::new(10.0, 20.0, 640.0, 480.0),
        )];

        let table = format_windows_table(&windows);

        assert!(table.contains("(untitled)"));
        assert!(table.contains("640x480"));
        assert!(table.contains("x:10 y:20"));
    }
}
