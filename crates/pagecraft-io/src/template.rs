use std::fs;
use std::path::Path;

use pagecraft_core::Template;
use pagecraft_renderer::RenderOptions;

use crate::error::IoError;

/// Read a template from a JSON file.
pub fn load_template(path: impl AsRef<Path>) -> Result<Template, IoError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)?;
    let template = Template::from_json(&json)?;
    log::info!(
        "Loaded template '{}' from {} ({} pages, {} shapes)",
        template.name,
        path.display(),
        template.page_count(),
        template.schema_count()
    );
    Ok(template)
}

/// Write a template as pretty-printed JSON, replacing any existing file.
pub fn save_template(path: impl AsRef<Path>, template: &Template) -> Result<(), IoError> {
    let path = path.as_ref();
    fs::write(path, template.to_json()?)?;
    log::info!("Saved template '{}' to {}", template.name, path.display());
    Ok(())
}

/// Read render options from a JSON file. Missing keys take their defaults.
pub fn load_options(path: impl AsRef<Path>) -> Result<RenderOptions, IoError> {
    let json = fs::read_to_string(path.as_ref())?;
    Ok(RenderOptions::from_json(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_core::{ColorMode, PageSize, Schema};

    #[test]
    fn test_template_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.json");

        let mut template = Template::new("invoice", PageSize::LETTER);
        let page = template.add_page();
        template
            .add_schema(
                page,
                Schema::new("line")
                    .with_position(10.0, 20.0)
                    .with_size(100.0, 1.0)
                    .with_field("color", "#336699"),
            )
            .unwrap();

        save_template(&path, &template).unwrap();
        let loaded = load_template(&path).unwrap();

        assert_eq!(loaded, template);
        assert_eq!(loaded.pages[0][0].str_field("color"), Some("#336699"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_template(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }

    #[test]
    fn test_load_malformed_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_template(&path), Err(IoError::Template(_))));
    }

    #[test]
    fn test_load_options() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        fs::write(&path, r#"{"colorType":"cmyk"}"#).unwrap();
        let options = load_options(&path).unwrap();
        assert_eq!(options.color_type, ColorMode::Cmyk);
    }
}
