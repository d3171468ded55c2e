//! Minimal single-font PDF writer for exported records.
//!
//! Produces US Letter pages set in the standard Helvetica fonts, so no font
//! data is embedded. Text outside Latin-1 is replaced with `?`.

use std::fmt::Write as _;

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 11.0;
const LEADING: f32 = 15.0;
// Average Helvetica advance as a fraction of the point size.
const AVG_ADVANCE: f32 = 0.5;

struct PageLayout {
    first_page_lines: usize,
    other_page_lines: usize,
}

impl PageLayout {
    fn letter() -> Self {
        let usable = PAGE_HEIGHT - 2.0 * MARGIN;
        let header = TITLE_SIZE + 2.0 * LEADING;
        Self {
            first_page_lines: ((usable - header) / LEADING) as usize,
            other_page_lines: (usable / LEADING) as usize,
        }
    }

    fn paginate<'a>(&self, lines: &'a [String]) -> Vec<&'a [String]> {
        let mut pages = Vec::new();
        let first = lines.len().min(self.first_page_lines);
        pages.push(&lines[..first]);
        let mut rest = &lines[first..];
        while !rest.is_empty() {
            let take = rest.len().min(self.other_page_lines);
            pages.push(&rest[..take]);
            rest = &rest[take..];
        }
        pages
    }
}

pub fn render(title: &str, lines: &[String]) -> Vec<u8> {
    let layout = PageLayout::letter();
    let pages = layout.paginate(lines);

    // Object numbers: 1 catalog, 2 page tree, 3 body font, 4 title font,
    // then a (page, content) pair per page.
    let page_ids = (0..pages.len())
        .map(|idx| 5 + idx * 2)
        .collect::<Vec<_>>();
    let mut objects: Vec<Vec<u8>> = Vec::new();
    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");
    objects.push(format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()).into_bytes());
    objects.push(font_object("Helvetica"));
    objects.push(font_object("Helvetica-Bold"));

    for (idx, page_lines) in pages.iter().enumerate() {
        let content = page_content(if idx == 0 { Some(title) } else { None }, page_lines);
        let page = format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
            page_ids[idx] + 1
        );
        objects.push(page.into_bytes());
        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(&content);
        stream.extend_from_slice(b"\nendstream");
        objects.push(stream);
    }

    assemble(&objects)
}

fn font_object(base: &str) -> Vec<u8> {
    format!("<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding /WinAnsiEncoding >>")
        .into_bytes()
}

fn page_content(title: Option<&str>, lines: &[String]) -> Vec<u8> {
    let mut ops = String::new();
    let mut y = PAGE_HEIGHT - MARGIN;
    if let Some(title) = title {
        let width = title.chars().count() as f32 * TITLE_SIZE * AVG_ADVANCE;
        let x = ((PAGE_WIDTH - width) / 2.0).max(MARGIN);
        let _ = writeln!(
            ops,
            "BT /F2 {TITLE_SIZE} Tf {x:.2} {y:.2} Td ({}) Tj ET",
            escape(title)
        );
        y -= LEADING;
        let _ = writeln!(
            ops,
            "0.75 w {MARGIN} {y:.2} m {:.2} {y:.2} l S",
            PAGE_WIDTH - MARGIN
        );
        y -= LEADING;
    }
    for line in lines {
        y -= LEADING;
        let _ = writeln!(
            ops,
            "BT /F1 {BODY_SIZE} Tf {MARGIN} {y:.2} Td ({}) Tj ET",
            escape(line)
        );
    }
    latin1(&ops)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' | '\r' | '\t' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}

fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| if (ch as u32) < 0x100 { ch as u8 } else { b'?' })
        .collect()
}

fn assemble(objects: &[Vec<u8>]) -> Vec<u8> {
    let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (idx, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", idx + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }
    let xref_at = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = writeln!(xref, "{offset:010} 00000 n ");
    }
    let _ = write!(
        xref,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    );
    out.extend_from_slice(xref.as_bytes());
    out
}
