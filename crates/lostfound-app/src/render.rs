use std::io::{self, Write};

use lostfound_types::{ImagePreview, ItemWithPoster};

const HEADERS: [&str; 7] = ["ID", "Status", "Item", "Description", "Contact", "Posted By", "Image"];

fn image_cell(item: &ItemWithPoster) -> String {
    match item.image_preview() {
        ImagePreview::NoImage => "-".to_string(),
        preview => preview.to_string(),
    }
}

/// Table cells are single-line; descriptions may not be.
fn flatten(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn row(item: &ItemWithPoster) -> [String; 7] {
    [
        item.id.to_string(),
        item.status.to_string(),
        flatten(&item.name),
        flatten(&item.description),
        flatten(&item.contact),
        item.poster.clone(),
        image_cell(item),
    ]
}

pub fn items_table(items: &[ItemWithPoster], out: &mut dyn Write) -> io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "No items posted yet.");
    }

    let rows: Vec<[String; 7]> = items.iter().map(row).collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_line(out, &HEADERS.map(String::from), &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(out, "{}", rule.join("  "))?;
    for cells in &rows {
        write_line(out, cells, &widths)?;
    }
    Ok(())
}

fn write_line(out: &mut dyn Write, cells: &[String; 7], widths: &[usize; 7]) -> io::Result<()> {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    writeln!(out, "{}", padded.join("  ").trim_end())
}

pub fn item_detail(item: &ItemWithPoster, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "ID:          {}", item.id)?;
    writeln!(out, "Status:      {}", item.status)?;
    writeln!(out, "Item:        {}", item.name)?;
    writeln!(out, "Description: {}", item.description)?;
    writeln!(out, "Contact:     {}", item.contact)?;
    writeln!(out, "Posted by:   {}", item.poster)?;
    writeln!(out, "Image:       {}", item.image_preview())
}

pub fn json<T: serde::Serialize + ?Sized>(value: &T, out: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lostfound_types::ItemStatus;

    fn item(id: i64, image_path: Option<&str>) -> ItemWithPoster {
        ItemWithPoster {
            id,
            name: "Keys".into(),
            description: "Found near\nthe gate".into(),
            status: ItemStatus::Found,
            contact: "alice@mail".into(),
            image_path: image_path.map(String::from),
            owner_id: 1,
            poster: "alice".into(),
        }
    }

    fn render(items: &[ItemWithPoster]) -> String {
        let mut out = Vec::new();
        items_table(items, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn empty_board() {
        assert_eq!(render(&[]), "No items posted yet.\n");
    }

    #[test]
    fn table_has_header_rule_and_rows() {
        let text = render(&[item(1, None), item(12, Some("/nowhere/keys.png"))]);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID  Status"));
        assert!(lines[1].starts_with("--  ------"));
        assert!(lines[2].contains("Found near the gate"));
        assert!(lines[2].ends_with("-"));
        assert!(lines[3].starts_with("12  Found"));
        assert!(lines[3].ends_with("No Image Available"));
    }

    #[test]
    fn detail_shows_image_state() {
        let mut out = Vec::new();
        item_detail(&item(4, Some("/nowhere/keys.png")), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Posted by:   alice"));
        assert!(text.contains("Image:       No Image Available"));
    }

    #[test]
    fn json_uses_stored_status_text() {
        let mut out = Vec::new();
        json(&[item(1, None)], &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value[0]["status"], "Found");
        assert_eq!(value[0]["poster"], "alice");
        assert!(value[0]["image_path"].is_null());
    }
}
