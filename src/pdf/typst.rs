use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::raster::{
    paginate, png_dimensions, scaled_height_mm, A4_HEIGHT_MM, A4_WIDTH_MM, BASE_PPI,
};
use crate::error::{LedgerError, Result};
use crate::report::Document;
use crate::util::ids::new_id;

/// Embedded Typst template for the financial statements.
/// Reads the document tree from document.json; `--input paged=true` lays it
/// out on A4 pages, otherwise it is one page of automatic height.
const DOCUMENT_TEMPLATE: &str = r##"// Financial statements
#let doc = json("document.json")
#let paged = sys.inputs.at("paged", default: "false") == "true"

#set page(
  width: 210mm,
  height: if paged { 297mm } else { auto },
  margin: (x: 18mm, y: 16mm),
  fill: white,
)

#set text(font: "Helvetica", size: 9.5pt)

#let row(r) = {
  let style = r.style
  if style == "heading" {
    v(0.8em)
    text(weight: "bold", size: 8pt, tracking: 0.06em, upper(r.label))
  } else if style == "sub_heading" {
    v(0.6em)
    underline(text(weight: "semibold", r.label))
  } else if style == "placeholder" {
    block(inset: (y: 4pt), text(style: "italic", size: 8pt, fill: gray, r.label))
  } else {
    let strong = style == "total" or style == "subtotal"
    let weight = if strong { "bold" } else { "regular" }
    block(
      width: 100%,
      inset: (x: if style == "subtotal" { 4pt } else { 0pt }, y: 4pt),
      fill: if style == "subtotal" { luma(245) } else { none },
      stroke: if style == "total" {
        (top: 1pt + black, bottom: 2pt + black)
      } else {
        (bottom: 0.5pt + luma(225))
      },
      grid(
        columns: (1fr, auto),
        text(weight: weight, if style == "total" { upper(r.label) } else { r.label }),
        text(weight: weight, r.display),
      ),
    )
  }
}

#align(center)[
  #text(size: 20pt, weight: "bold", upper(doc.letterhead.company)) \
  #text(size: 12pt, fill: gray, upper(doc.letterhead.title)) \
  #text(size: 9pt, fill: gray, doc.letterhead.period)
]
#line(length: 100%, stroke: 1.5pt)

#for section in doc.sections {
  v(1.5em)
  if section.kind == "opinion" {
    text(weight: "bold", size: 12pt, upper(section.title))
    block(
      width: 100%,
      inset: 12pt,
      fill: luma(248),
      stroke: (left: 3pt + rgb("#312e81")),
      emph(section.text),
    )
  } else if section.kind == "statement" {
    align(center, text(weight: "bold", size: 12pt, upper(section.title)))
    if section.subtitle != none {
      align(center, text(size: 8pt, fill: gray, upper(section.subtitle)))
    }
    grid(
      columns: (1fr,) * section.groups.len(),
      column-gutter: 24pt,
      ..section.groups.map(g => {
        if g.heading != none {
          text(weight: "bold", size: 8pt, upper(g.heading))
          line(length: 100%, stroke: 0.5pt + gray)
        }
        for r in g.rows { row(r) }
      }),
    )
  } else if section.kind == "notes" {
    text(weight: "bold", upper(section.title))
    enum(..section.notes.map(n => text(size: 8pt, n)))
  }
}

#v(2em)
#line(length: 100%, stroke: 1.5pt)
#grid(
  columns: (1fr, auto),
  [
    #text(size: 8pt, doc.footer.sign_off)
    #v(2em)
    #stack(
      dir: ltr,
      spacing: 24pt,
      ..doc.footer.signatories.map(s => box(
        width: 30mm,
        stroke: (top: 0.5pt + gray),
        inset: (top: 3pt),
        align(center, text(size: 8pt, s)),
      )),
    )
  ],
  align(right, text(size: 8pt, fill: gray, doc.footer.generated_by)),
)
"##;

/// Places one tall raster on successive A4 pages, shifted up by the given
/// offsets (in millimetres).
const RASTER_TEMPLATE: &str = r##"// Paginated raster
#let data = json("raster.json")

#set page(paper: "a4", margin: 0pt)

#for (i, offset) in data.offsets.enumerate() {
  if i > 0 { pagebreak() }
  place(top + left, dy: -offset * 1mm, image(data.image, width: 210mm))
}
"##;

#[derive(Serialize)]
struct RasterLayout<'a> {
    image: &'a str,
    offsets: Vec<f64>,
}

/// Scratch directory for one typesetting run, removed on drop
struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    fn create(doc: &Document) -> Result<Self> {
        ensure_typst()?;
        let dir = std::env::temp_dir().join(format!("ledgerbook-{}", new_id()));
        std::fs::create_dir_all(&dir)?;

        let json = serde_json::to_string(doc).map_err(|e| LedgerError::PdfExport(e.to_string()))?;
        std::fs::write(dir.join("document.json"), json)?;
        std::fs::write(dir.join("statements.typ"), DOCUMENT_TEMPLATE)?;
        Ok(Self { dir })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Run `typst compile` rooted at the workspace
    fn compile(&self, template: &str, target: &Path, extra: &[String]) -> Result<()> {
        let output = Command::new("typst")
            .arg("compile")
            .arg("--root")
            .arg(&self.dir)
            .args(extra)
            .arg(self.path(template))
            .arg(target)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LedgerError::PdfExport(stderr.trim().to_string()));
        }
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn ensure_typst() -> Result<()> {
    Command::new("typst")
        .arg("--version")
        .output()
        .map(|_| ())
        .map_err(|_| LedgerError::TypstNotFound)
}

/// Write the statements to `output_path` as raster A4 pages.
///
/// The document is typeset as a single page of automatic height,
/// rasterized at `raster_scale` (1.0 = 72 ppi), and that image is then
/// sliced across as many A4 pages as it needs.
pub fn export_pdf(doc: &Document, output_path: &Path, raster_scale: f64) -> Result<()> {
    let ws = Workspace::create(doc)?;
    let ppi = BASE_PPI * raster_scale.max(0.5);

    let png = ws.path("statements.png");
    ws.compile(
        "statements.typ",
        &png,
        &[
            "--format".to_string(),
            "png".to_string(),
            "--ppi".to_string(),
            ppi.to_string(),
        ],
    )?;

    let (width_px, height_px) = png_dimensions(&std::fs::read(&png)?)?;
    let offsets = paginate(scaled_height_mm(width_px, height_px, A4_WIDTH_MM), A4_HEIGHT_MM);
    tracing::debug!(width_px, height_px, pages = offsets.len(), "paginating raster");

    let layout = RasterLayout {
        image: "statements.png",
        offsets,
    };
    let json = serde_json::to_string(&layout).map_err(|e| LedgerError::PdfExport(e.to_string()))?;
    std::fs::write(ws.path("raster.json"), json)?;
    std::fs::write(ws.path("raster.typ"), RASTER_TEMPLATE)?;

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    ws.compile("raster.typ", output_path, &[])
}

/// Typeset the statements on A4 pages and send them to the printer
pub fn print_document(doc: &Document, print_command: Option<&str>) -> Result<()> {
    let ws = Workspace::create(doc)?;
    let pdf = ws.path("statements.pdf");
    ws.compile(
        "statements.typ",
        &pdf,
        &["--input".to_string(), "paged=true".to_string()],
    )?;

    let (program, args) = parse_print_command(print_command.unwrap_or("lp"))?;

    let output = Command::new(&program)
        .args(&args)
        .arg(&pdf)
        .output()
        .map_err(|e| LedgerError::PrintFailed(format!("{program}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(LedgerError::PrintFailed(stderr.trim().to_string()));
    }
    Ok(())
}

/// Program and leading arguments of a configured print command
fn parse_print_command(command: &str) -> Result<(String, Vec<String>)> {
    let mut parts = shlex::split(command)
        .ok_or_else(|| LedgerError::PrintFailed(format!("unbalanced quotes in '{command}'")))?
        .into_iter();
    let program = parts
        .next()
        .ok_or_else(|| LedgerError::PrintFailed("print command is empty".to_string()))?;
    Ok((program, parts.collect()))
}
