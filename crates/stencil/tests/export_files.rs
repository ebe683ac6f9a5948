//! File-based export tests.

use std::fs;
use std::io::Write;
use std::sync::{Arc, Mutex};

use stencil::markup::Document;
use stencil::tabular::{GridFormat, Sheet, Workbook};
use stencil::{
    export_markup, export_markup_with, export_workbook, ConfigError, ExportConfig, ExportError,
    MapRecord, MarkupRenderer, Orientation, PageSettings, PageSize, RenderOptions,
};
use tempfile::TempDir;

/// A writer whose bytes stay readable after the config took ownership.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn people_template() -> Workbook {
    let mut sheet = Sheet::new("People");
    sheet.set_value(1, 1, "Name");
    sheet.set_value(2, 1, "{{L::Name}}");
    Workbook::new().with_sheet(sheet)
}

fn people() -> Vec<MapRecord> {
    vec![
        MapRecord::new().with("Name", "A"),
        MapRecord::new().with("Name", "B"),
    ]
}

// ============================================================================
// Workbooks
// ============================================================================

#[test]
fn workbook_json_file_to_csv_file() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("template.json");
    fs::write(&template, serde_json::to_string(&people_template()).unwrap()).unwrap();
    let output = dir.path().join("out.csv");

    let config = ExportConfig::builder()
        .template_path(&template)
        .output_path(&output)
        .dataset("L", people())
        .build()
        .unwrap();
    export_workbook(config).unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), "Name\nA\nB\n");
}

#[test]
fn workbook_yaml_round_trip() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("template.yaml");
    let mut file = fs::File::create(&template).unwrap();
    GridFormat::Yaml.write(&people_template(), &mut file).unwrap();
    drop(file);
    let output = dir.path().join("out.yml");

    let config = ExportConfig::builder()
        .template_path(&template)
        .output_path(&output)
        .dataset("L", people())
        .build()
        .unwrap();
    export_workbook(config).unwrap();

    let rendered = GridFormat::load(&output).unwrap();
    let sheet = rendered.sheet("People").unwrap();
    assert_eq!(sheet.last_row(), 3);
    assert_eq!(sheet.value(3, 1).as_text(), Some("B"));
}

#[test]
fn workbook_to_writer_defaults_to_json() {
    let out = SharedBuffer::default();
    let config = ExportConfig::builder()
        .template_workbook(people_template())
        .output_writer(out.clone())
        .dataset("L", people())
        .build()
        .unwrap();
    export_workbook(config).unwrap();

    let rendered: Workbook = serde_json::from_str(&out.text()).unwrap();
    assert_eq!(rendered.sheets[0].value(2, 1).as_text(), Some("A"));
}

#[test]
fn explicit_format_wins_over_extension() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.json");
    let config = ExportConfig::builder()
        .template_workbook(people_template())
        .output_path(&output)
        .workbook_format(GridFormat::Csv)
        .dataset("L", people())
        .build()
        .unwrap();
    export_workbook(config).unwrap();
    assert_eq!(fs::read_to_string(&output).unwrap(), "Name\nA\nB\n");
}

#[test]
fn unknown_output_extension_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let config = ExportConfig::builder()
        .template_workbook(people_template())
        .output_path(dir.path().join("out.xlsx"))
        .build()
        .unwrap();
    let err = export_workbook(config).unwrap_err();
    assert!(matches!(
        err,
        ExportError::Config(ConfigError::UnknownFormat { .. })
    ));
}

#[test]
fn failed_export_leaves_no_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.json");
    let mut sheet = Sheet::new("S");
    sheet.set_value(1, 1, "{{L::Name}}");
    sheet.set_value(1, 2, "{{M::Name}}");

    let config = ExportConfig::builder()
        .template_workbook(Workbook::new().with_sheet(sheet))
        .output_path(&output)
        .dataset("L", people())
        .dataset("M", people())
        .build()
        .unwrap();
    let err = export_workbook(config).unwrap_err();

    assert!(matches!(err, ExportError::TemplateConflict { .. }));
    assert!(!output.exists());
}

#[test]
fn missing_template_file_is_unreadable() {
    let dir = TempDir::new().unwrap();
    let config = ExportConfig::builder()
        .template_path(dir.path().join("absent.json"))
        .output_writer(std::io::sink())
        .build()
        .unwrap();
    let err = export_workbook(config).unwrap_err();
    assert!(matches!(
        err,
        ExportError::Config(ConfigError::TemplateUnreadable { .. })
    ));
}

// ============================================================================
// Markup
// ============================================================================

#[test]
fn markup_file_to_file() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("report.html");
    fs::write(
        &template,
        r#"<ul><li template-for="L">{{L::Name}}</li></ul>"#,
    )
    .unwrap();
    let output = dir.path().join("report.out.html");

    let config = ExportConfig::builder()
        .template_path(&template)
        .output_path(&output)
        .dataset("L", people())
        .build()
        .unwrap();
    let misses = export_markup(config).unwrap();

    assert!(misses.is_empty());
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "<ul><li>A</li><li>B</li></ul>"
    );
}

#[test]
fn markup_from_fragments() {
    let dir = TempDir::new().unwrap();
    let head = dir.path().join("head.html");
    let body = dir.path().join("body.html");
    fs::write(&head, "<title>{{T}}</title>").unwrap();
    fs::write(&body, "<h1>{{T}}</h1>").unwrap();

    let out = SharedBuffer::default();
    let config = ExportConfig::builder()
        .head_fragment(&head)
        .body_fragment(&body)
        .output_writer(out.clone())
        .dataset("T", "Report")
        .build()
        .unwrap();
    export_markup(config).unwrap();

    assert_eq!(
        out.text(),
        "<html><head><title>Report</title></head><body><h1>Report</h1></body></html>"
    );
}

#[test]
fn malformed_markup_is_an_error_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.html");
    let config = ExportConfig::builder()
        .template_inline("<p><b></p>")
        .output_path(&output)
        .build()
        .unwrap();
    let err = export_markup(config).unwrap_err();
    assert!(matches!(err, ExportError::Markup(_)));
    assert!(!output.exists());
}

#[test]
fn workbook_template_is_rejected_for_markup() {
    let config = ExportConfig::builder()
        .template_workbook(Workbook::new())
        .output_writer(std::io::sink())
        .build()
        .unwrap();
    let err = export_markup(config).unwrap_err();
    assert!(matches!(
        err,
        ExportError::Config(ConfigError::TemplateMismatch { kind: "markup", .. })
    ));
}

struct PageEcho;

impl MarkupRenderer for PageEcho {
    fn render(
        &self,
        _document: &Document,
        page: &PageSettings,
        out: &mut dyn Write,
    ) -> stencil::Result<()> {
        let (width, height) = page.dimensions_mm();
        write!(out, "{}x{}", width, height)?;
        Ok(())
    }
}

#[test]
fn custom_renderer_receives_page_settings() {
    let out = SharedBuffer::default();
    let options = RenderOptions::builder()
        .page(PageSettings::new(PageSize::A4, Orientation::Landscape))
        .build()
        .unwrap();
    let config = ExportConfig::builder()
        .template_inline("<p/>")
        .output_writer(out.clone())
        .options(options)
        .build()
        .unwrap();
    export_markup_with(config, &PageEcho).unwrap();

    assert_eq!(out.text(), "297x210");
}
