use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use pagecraft_core::TargetColor;
use pagecraft_renderer::{LineOptions, Page, RectangleOptions};

use crate::error::IoError;

fn real(value: f64) -> Object {
    Object::from(value as f32)
}

// ── Page ─────────────────────────────────────────────────────────────

/// A PDF page under construction. Draw calls become content stream
/// operations; each shape is wrapped in its own `q`/`Q` pair so graphics
/// state never leaks from one shape to the next.
pub struct PdfPage {
    width: f64,
    height: f64,
    content: Content,
    /// Distinct opacities in use; index `i` is the `/GS{i}` graphics state.
    opacities: Vec<f64>,
}

impl PdfPage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            content: Content { operations: vec![] },
            opacities: Vec::new(),
        }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.content.operations
    }

    /// Operator names in stream order.
    pub fn operators(&self) -> Vec<&str> {
        self.content.operations.iter().map(|op| op.operator.as_str()).collect()
    }

    /// The page's `/Resources` dictionary.
    pub fn resources(&self) -> Dictionary {
        let mut resources = Dictionary::new();
        if !self.opacities.is_empty() {
            let mut states = Dictionary::new();
            for (index, opacity) in self.opacities.iter().enumerate() {
                states.set(
                    format!("GS{index}"),
                    dictionary! {
                        "Type" => "ExtGState",
                        "CA" => real(*opacity),
                        "ca" => real(*opacity),
                    },
                );
            }
            resources.set("ExtGState", states);
        }
        resources
    }

    pub fn encode(&self) -> Result<Vec<u8>, IoError> {
        Ok(self.content.encode()?)
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.content.operations.push(Operation::new(operator, operands));
    }

    fn set_opacity(&mut self, opacity: f64) {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity >= 1.0 {
            return;
        }
        let index = match self.opacities.iter().position(|o| *o == opacity) {
            Some(index) => index,
            None => {
                self.opacities.push(opacity);
                self.opacities.len() - 1
            }
        };
        self.push("gs", vec![Object::Name(format!("GS{index}").into_bytes())]);
    }

    fn set_color(&mut self, color: &TargetColor, stroke: bool) {
        match *color {
            TargetColor::Rgb { r, g, b } => {
                let op = if stroke { "RG" } else { "rg" };
                self.push(op, vec![real(r), real(g), real(b)]);
            }
            TargetColor::Cmyk { c, m, y, k } => {
                let op = if stroke { "K" } else { "k" };
                self.push(op, vec![real(c), real(m), real(y), real(k)]);
            }
        }
    }
}

impl Page for PdfPage {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn draw_line(&mut self, line: &LineOptions) {
        self.push("q", vec![]);
        self.set_opacity(line.opacity);
        self.set_color(&line.color, true);
        self.push("w", vec![real(line.thickness)]);
        self.push("m", vec![real(line.start.x), real(line.start.y)]);
        self.push("l", vec![real(line.end.x), real(line.end.y)]);
        self.push("S", vec![]);
        self.push("Q", vec![]);
    }

    fn draw_rectangle(&mut self, rect: &RectangleOptions) {
        let paint = match (&rect.color, &rect.border_color) {
            (Some(_), Some(_)) => "B",
            (Some(_), None) => "f",
            (None, Some(_)) => "S",
            (None, None) => return,
        };

        self.push("q", vec![]);
        self.set_opacity(rect.opacity);
        let (sin, cos) = rect.rotate.radians().sin_cos();
        self.push(
            "cm",
            vec![real(cos), real(sin), real(-sin), real(cos), real(rect.x), real(rect.y)],
        );
        if let Some(fill) = &rect.color {
            self.set_color(fill, false);
        }
        if let Some(border) = &rect.border_color {
            self.set_color(border, true);
            self.push("w", vec![real(rect.border_width)]);
        }
        self.push(
            "re",
            vec![real(0.0), real(0.0), real(rect.width), real(rect.height)],
        );
        self.push(paint, vec![]);
        self.push("Q", vec![]);
    }
}

// ── Document ─────────────────────────────────────────────────────────

/// Assembles finished pages into a PDF document.
pub struct PdfWriter {
    document: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            page_ids: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    pub fn add_page(&mut self, page: PdfPage) -> Result<ObjectId, IoError> {
        let content = Stream::new(Dictionary::new(), page.encode()?);
        let content_id = self.document.add_object(content);

        let page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![real(0.0), real(0.0), real(page.width), real(page.height)],
            "Contents" => content_id,
            "Resources" => page.resources(),
        };
        let page_id = self.document.add_object(page_dict);
        self.page_ids.push(page_id);
        Ok(page_id)
    }

    /// Link the page tree and serialize the document.
    pub fn finish(mut self) -> Result<Vec<u8>, IoError> {
        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        self.document.save_to(&mut bytes)?;
        log::debug!("Wrote PDF with {} pages ({} bytes)", self.page_ids.len(), bytes.len());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_core::{Point, Rotation};

    fn black() -> TargetColor {
        TargetColor::Rgb {
            r: 0.0,
            g: 0.0,
            b: 0.0,
        }
    }

    fn line(opacity: f64) -> LineOptions {
        LineOptions {
            start: Point::new(0.0, 99.5),
            end: Point::new(50.0, 99.5),
            thickness: 1.0,
            color: black(),
            opacity,
        }
    }

    fn rect(color: Option<TargetColor>, border_color: Option<TargetColor>) -> RectangleOptions {
        RectangleOptions {
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 40.0,
            rotate: Rotation::degrees(0.0),
            border_width: 2.0,
            border_color,
            color,
            opacity: 1.0,
        }
    }

    #[test]
    fn test_line_operations() {
        let mut page = PdfPage::new(100.0, 100.0);
        page.draw_line(&line(1.0));
        assert_eq!(page.operators(), vec!["q", "RG", "w", "m", "l", "S", "Q"]);
        assert!(page.resources().get(b"ExtGState").is_err());
    }

    #[test]
    fn test_opacity_states_are_shared() {
        let mut page = PdfPage::new(100.0, 100.0);
        page.draw_line(&line(0.5));
        page.draw_line(&line(0.5));
        page.draw_line(&line(0.25));

        let names: Vec<Vec<u8>> = page
            .operations()
            .iter()
            .filter(|op| op.operator == "gs")
            .map(|op| op.operands[0].as_name().unwrap().to_vec())
            .collect();
        assert_eq!(names, vec![b"GS0".to_vec(), b"GS0".to_vec(), b"GS1".to_vec()]);

        let resources = page.resources();
        let states = resources.get(b"ExtGState").unwrap().as_dict().unwrap();
        assert_eq!(states.len(), 2);
    }

    #[test]
    fn test_cmyk_uses_cmyk_operators() {
        let mut page = PdfPage::new(100.0, 100.0);
        let mut cmyk = line(1.0);
        cmyk.color = TargetColor::Cmyk {
            c: 0.0,
            m: 0.0,
            y: 0.0,
            k: 1.0,
        };
        page.draw_line(&cmyk);
        assert!(page.operators().contains(&"K"));
        assert!(!page.operators().contains(&"RG"));
    }

    #[test]
    fn test_rectangle_paint_operator() {
        let mut page = PdfPage::new(100.0, 100.0);
        page.draw_rectangle(&rect(Some(black()), Some(black())));
        assert_eq!(page.operators(), vec!["q", "cm", "rg", "RG", "w", "re", "B", "Q"]);

        let mut page = PdfPage::new(100.0, 100.0);
        page.draw_rectangle(&rect(Some(black()), None));
        assert!(page.operators().contains(&"f"));

        let mut page = PdfPage::new(100.0, 100.0);
        page.draw_rectangle(&rect(None, None));
        assert!(page.operations().is_empty());
    }

    #[test]
    fn test_writer_produces_loadable_pdf() {
        let mut writer = PdfWriter::new();
        let mut first = PdfPage::new(595.0, 842.0);
        first.draw_line(&line(1.0));
        writer.add_page(first).unwrap();
        writer.add_page(PdfPage::new(595.0, 842.0)).unwrap();
        assert_eq!(writer.page_count(), 2);

        let bytes = writer.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));

        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);

        let first_id = pages[&1];
        let content = Content::decode(&doc.get_page_content(first_id).unwrap()).unwrap();
        let operators: Vec<&str> = content.operations.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(operators, vec!["q", "RG", "w", "m", "l", "S", "Q"]);
    }
}
