use serde::{Deserialize, Serialize};

use crate::document::{LineOptions, Page, RectangleOptions};

/// A single draw call issued by a document renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCommand {
    Line(LineOptions),
    Rectangle(RectangleOptions),
}

/// A page that records draw calls instead of encoding them, in the order
/// they were issued. Used for previews and as a reference backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedPage {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

impl RecordedPage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &LineOptions> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Line(line) => Some(line),
            _ => None,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Page for RecordedPage {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn draw_line(&mut self, line: &LineOptions) {
        self.commands.push(DrawCommand::Line(line.clone()));
    }

    fn draw_rectangle(&mut self, rect: &RectangleOptions) {
        self.commands.push(DrawCommand::Rectangle(rect.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_core::{Point, Rotation, TargetColor};

    fn gray() -> TargetColor {
        TargetColor::Rgb {
            r: 0.5,
            g: 0.5,
            b: 0.5,
        }
    }

    fn sample() -> RecordedPage {
        let mut page = RecordedPage::new(200.0, 100.0);
        page.draw_rectangle(&RectangleOptions {
            x: 10.0,
            y: 10.0,
            width: 40.0,
            height: 20.0,
            rotate: Rotation::degrees(0.0),
            border_width: 0.0,
            border_color: None,
            color: Some(gray()),
            opacity: 1.0,
        });
        page.draw_line(&LineOptions {
            start: Point::new(0.0, 50.0),
            end: Point::new(200.0, 50.0),
            thickness: 2.0,
            color: gray(),
            opacity: 0.5,
        });
        page
    }

    #[test]
    fn test_lines_skips_other_commands() {
        let page = sample();
        assert_eq!(page.commands.len(), 2);
        let lines: Vec<&LineOptions> = page.lines().collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].thickness, 2.0);
    }

    #[test]
    fn test_to_json_tags_commands() {
        let page = sample();
        let json = page.to_json().unwrap();
        assert!(json.contains(r#""op": "rectangle""#));
        assert!(json.contains(r#""op": "line""#));
        let back: RecordedPage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, page);
    }
}
