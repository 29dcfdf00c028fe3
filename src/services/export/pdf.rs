//! Paginated document encoder
//!
//! A4 portrait, monospaced Courier so column widths can be computed in
//! characters. Every page repeats the title block and the column header
//! row, and carries a "Page N of M" footer.
//!
//! Tables too wide for one line are split into column blocks. Each block
//! is printed over all rows before the next block starts, so a wide report
//! reads like several narrower ones stapled together.

use super::ExportTable;
use crate::services::error::ExportError;
use chrono::NaiveDateTime;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::ops::Range;

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 36;
const BODY_FONT_SIZE: i64 = 8;
const TITLE_FONT_SIZE: i64 = 12;
const LINE_HEIGHT: i64 = 10;
const FOOTER_Y: i64 = 20;

/// Courier glyphs are 600/1000 em wide
const CHAR_WIDTH_MILLI: i64 = 600 * BODY_FONT_SIZE;

/// Characters that fit across the printable width at body size
pub const LINE_CHARS: usize = (((PAGE_WIDTH - 2 * MARGIN) * 1000) / CHAR_WIDTH_MILLI) as usize;

const TITLE_Y: i64 = PAGE_HEIGHT - MARGIN - TITLE_FONT_SIZE;
const GENERATED_Y: i64 = TITLE_Y - 14;
const HEADER_Y: i64 = GENERATED_Y - 2 * LINE_HEIGHT;
const RULE_Y: i64 = HEADER_Y - LINE_HEIGHT;
const FIRST_BODY_Y: i64 = RULE_Y - LINE_HEIGHT;
const LAST_BODY_Y: i64 = FOOTER_Y + 2 * LINE_HEIGHT;

/// Body rows that fit on one page below the repeated header
pub const ROWS_PER_PAGE: usize = ((FIRST_BODY_Y - LAST_BODY_Y) / LINE_HEIGHT + 1) as usize;

const COLUMN_GAP: usize = 1;

/// Narrowest column printed; wider tables continue in another block
pub const MIN_COLUMN_WIDTH: usize = 10;

/// Columns that fit on one line at `MIN_COLUMN_WIDTH`
pub const COLUMNS_PER_BLOCK: usize = (LINE_CHARS + COLUMN_GAP) / (MIN_COLUMN_WIDTH + COLUMN_GAP);

/// Width in characters given to each column
pub fn column_width(columns: usize) -> usize {
    if columns == 0 {
        return LINE_CHARS;
    }
    let gaps = (columns - 1) * COLUMN_GAP;
    (LINE_CHARS.saturating_sub(gaps) / columns).max(1)
}

/// Shorten `text` to `width` characters, ending in "..." when cut
pub fn fit(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width {
        return format!("{:<width$}", text, width = width);
    }
    if width <= 3 {
        return text.chars().take(width).collect();
    }
    let mut out: String = text.chars().take(width - 3).collect();
    out.push_str("...");
    out
}

/// Number of pages needed for `rows` body rows (at least one)
pub fn page_count(rows: usize) -> usize {
    rows.div_ceil(ROWS_PER_PAGE).max(1)
}

/// Consecutive column ranges, each narrow enough for one line
pub fn column_blocks(columns: usize) -> Vec<Range<usize>> {
    if columns == 0 {
        return vec![0..0];
    }
    (0..columns)
        .step_by(COLUMNS_PER_BLOCK)
        .map(|start| start..(start + COLUMNS_PER_BLOCK).min(columns))
        .collect()
}

fn table_line(cells: &[String], width: usize) -> String {
    let gap = " ".repeat(COLUMN_GAP);
    cells
        .iter()
        .map(|c| fit(c, width))
        .collect::<Vec<_>>()
        .join(&gap)
        .trim_end()
        .to_string()
}

/// WinAnsi-compatible bytes; characters outside Latin-1 become '?'
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .collect()
}

fn text_at(ops: &mut Vec<Operation>, font: &str, size: i64, x: i64, y: i64, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(font.as_bytes().to_vec()), Object::Integer(size)],
    ));
    ops.push(Operation::new(
        "Td",
        vec![Object::Integer(x), Object::Integer(y)],
    ));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(latin1(text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

/// Text shared by every page of one column block
struct BlockHeading<'a> {
    title: &'a str,
    generated: String,
    headers: &'a [String],
}

fn page_operations(
    heading: &BlockHeading<'_>,
    body: &[&[String]],
    page: usize,
    pages: usize,
) -> Vec<Operation> {
    let width = column_width(heading.headers.len());
    let mut ops = Vec::new();

    text_at(&mut ops, "F2", TITLE_FONT_SIZE, MARGIN, TITLE_Y, heading.title);
    text_at(&mut ops, "F1", BODY_FONT_SIZE, MARGIN, GENERATED_Y, &heading.generated);
    text_at(
        &mut ops,
        "F2",
        BODY_FONT_SIZE,
        MARGIN,
        HEADER_Y,
        &table_line(heading.headers, width),
    );
    text_at(
        &mut ops,
        "F1",
        BODY_FONT_SIZE,
        MARGIN,
        RULE_Y,
        &"-".repeat(LINE_CHARS),
    );

    let mut y = FIRST_BODY_Y;
    for &cells in body {
        text_at(&mut ops, "F1", BODY_FONT_SIZE, MARGIN, y, &table_line(cells, width));
        y -= LINE_HEIGHT;
    }

    let footer = format!("Page {} of {}", page, pages);
    let footer_width = footer.len() as i64 * CHAR_WIDTH_MILLI / 1000;
    text_at(
        &mut ops,
        "F1",
        BODY_FONT_SIZE,
        (PAGE_WIDTH - footer_width) / 2,
        FOOTER_Y,
        &footer,
    );
    ops
}

fn font(doc: &mut Document, base: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    })
}

pub fn encode(table: &ExportTable, generated_at: NaiveDateTime) -> Result<Vec<u8>, ExportError> {
    let generated = format!("Generated {}", generated_at.format("%Y-%m-%d %H:%M"));
    let body: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.export_text()).collect())
        .collect();
    let blocks = column_blocks(table.column_count());
    let row_pages = page_count(body.len());
    let pages = blocks.len() * row_pages;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular = font(&mut doc, "Courier");
    let bold = font(&mut doc, "Courier-Bold");
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages);
    for block in &blocks {
        let heading = BlockHeading {
            title: &table.title,
            generated: if blocks.len() > 1 {
                format!(
                    "{}  Columns {}-{} of {}",
                    generated,
                    block.start + 1,
                    block.end,
                    table.column_count()
                )
            } else {
                generated.clone()
            },
            headers: table.headers.get(block.clone()).unwrap_or(&[]),
        };
        let cells: Vec<&[String]> = body
            .iter()
            .map(|row| row.get(block.clone()).unwrap_or(&[]))
            .collect();

        for row_page in 0..row_pages {
            let start = row_page * ROWS_PER_PAGE;
            let end = (start + ROWS_PER_PAGE).min(cells.len());
            let content = Content {
                operations: page_operations(&heading, &cells[start..end], kids.len() + 1, pages),
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }
    }

    let page_tree = dictionary! {
        "Type" => "Pages",
        "Count" => Object::Integer(pages as i64),
        "Kids" => kids,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(PAGE_WIDTH),
            Object::Integer(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(page_tree));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}
