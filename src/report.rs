//! Spreadsheet report emission
//!
//! The bundled [`XlsxReportEmitter`] writes a single-sheet workbook with the
//! series as a table and a line chart of view counts and their rolling
//! average. The package is assembled directly as SpreadsheetML parts inside
//! a zip archive.
//!
//! ## Workbook layout
//!
//! | Column | Content | Format |
//! |---|---|---|
//! | A | Upload Date | date serial, `yyyy-mm-dd hh:mm` |
//! | B | Video ID | text |
//! | C | Title | text |
//! | D | View Count | integer |
//! | E | Moving Average | `0.00` |
//!
//! The chart is anchored at G2.

use crate::config::ReportConfig;
use crate::error::EmitError;
use crate::types::{ChannelAnalysis, VideoCount};
use chrono::{DateTime, NaiveDate, Utc};
use std::fs::File;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name of the only worksheet
pub const SHEET_NAME: &str = "Video Statistics";

/// Header row, one entry per column
pub const HEADERS: [&str; 5] = [
    "Upload Date",
    "Video ID",
    "Title",
    "View Count",
    "Moving Average",
];

/// Characters stripped from channel titles before they become file names
const FORBIDDEN_FILENAME_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

// Chart extent: 20 cm x 10 cm in EMU
const CHART_WIDTH_EMU: u64 = 7_200_000;
const CHART_HEIGHT_EMU: u64 = 3_600_000;

// Style indices into cellXfs
const STYLE_HEADER: u32 = 1;
const STYLE_DATE: u32 = 2;
const STYLE_DECIMAL: u32 = 3;

/// Something that turns an analysis into an artifact
pub trait ReportSink: Send + Sync {
    /// Render the analysis and return the path of the written artifact
    fn emit(&self, analysis: &ChannelAnalysis) -> Result<PathBuf, EmitError>;
}

/// Writes `<title>-<count>-<YYYYMMDD>.xlsx` workbooks into a directory
#[derive(Clone, Debug)]
pub struct XlsxReportEmitter {
    output_dir: PathBuf,
    report_date: Option<NaiveDate>,
}

impl XlsxReportEmitter {
    /// Create an emitter writing into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            report_date: None,
        }
    }

    /// Create an emitter from the report configuration
    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.output_dir.clone())
    }

    /// Stamp file names with this date instead of today's local date
    pub fn with_report_date(mut self, date: NaiveDate) -> Self {
        self.report_date = Some(date);
        self
    }

    /// Directory reports are written to
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn date(&self) -> NaiveDate {
        self.report_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

impl ReportSink for XlsxReportEmitter {
    fn emit(&self, analysis: &ChannelAnalysis) -> Result<PathBuf, EmitError> {
        if analysis.series.is_empty() {
            return Err(EmitError::EmptySeries {
                channel: analysis.channel.title.clone(),
            });
        }
        if !self.output_dir.is_dir() {
            return Err(EmitError::InvalidOutputDir(self.output_dir.clone()));
        }

        let file_name = report_file_name(&analysis.channel.title, analysis.requested, self.date());
        let path = self.output_dir.join(file_name);

        let file = File::create(&path)?;
        if let Err(e) = write_workbook(analysis, file) {
            if let Err(remove_err) = std::fs::remove_file(&path) {
                warn!(path = %path.display(), error = %remove_err, "failed to remove incomplete report");
            }
            return Err(e);
        }

        info!(
            path = %path.display(),
            channel = %analysis.channel.title,
            videos = analysis.series.len(),
            "report written"
        );
        Ok(path)
    }
}

/// File name for a report: `<sanitized title>-<count>-<YYYYMMDD>.xlsx`
///
/// `\ / * ? : " < > |` are removed from the title. A title that sanitizes to
/// nothing becomes "channel".
pub fn report_file_name(title: &str, count: VideoCount, date: NaiveDate) -> String {
    let sanitized: String = title
        .chars()
        .filter(|c| !FORBIDDEN_FILENAME_CHARS.contains(c) && !c.is_control())
        .collect();
    let sanitized = sanitized.trim();
    let stem = if sanitized.is_empty() { "channel" } else { sanitized };

    format!("{}-{}-{}.xlsx", stem, count, date.format("%Y%m%d"))
}

/// Excel serial date (days since 1899-12-30, fractional time of day)
pub fn excel_serial(at: DateTime<Utc>) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    (at - epoch).num_seconds() as f64 / 86_400.0
}

/// Write the complete workbook package to `writer`
pub fn write_workbook<W: Write + Seek>(
    analysis: &ChannelAnalysis,
    writer: W,
) -> Result<(), EmitError> {
    let mut zip = zip::ZipWriter::new(writer);
    let rows = analysis.series.len();

    write_part(&mut zip, "[Content_Types].xml", CONTENT_TYPES)?;
    write_part(&mut zip, "_rels/.rels", ROOT_RELS)?;
    write_part(&mut zip, "xl/workbook.xml", &workbook_xml())?;
    write_part(&mut zip, "xl/_rels/workbook.xml.rels", WORKBOOK_RELS)?;
    write_part(&mut zip, "xl/styles.xml", STYLES)?;
    write_part(&mut zip, "xl/worksheets/sheet1.xml", &worksheet_xml(analysis))?;
    write_part(&mut zip, "xl/worksheets/_rels/sheet1.xml.rels", SHEET_RELS)?;
    write_part(&mut zip, "xl/drawings/drawing1.xml", &drawing_xml())?;
    write_part(&mut zip, "xl/drawings/_rels/drawing1.xml.rels", DRAWING_RELS)?;
    write_part(
        &mut zip,
        "xl/charts/chart1.xml",
        &chart_xml(&analysis.channel.title, rows),
    )?;

    zip.finish()?;
    Ok(())
}

fn write_part<W: Write + Seek>(
    zip: &mut zip::ZipWriter<W>,
    name: &str,
    content: &str,
) -> Result<(), EmitError> {
    let options = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    zip.start_file(name, options)?;
    zip.write_all(content.as_bytes())?;
    Ok(())
}

/// Escape markup and drop characters XML 1.0 cannot carry
fn escape_xml(s: &str) -> String {
    let allowed: String = s
        .chars()
        .filter(|&c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .filter(|&c| !matches!(c, '\u{FFFE}' | '\u{FFFF}'))
        .collect();
    allowed
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
    <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
    <Override PartName="/xl/drawings/drawing1.xml" ContentType="application/vnd.openxmlformats-officedocument.drawing+xml"/>
    <Override PartName="/xl/charts/chart1.xml" ContentType="application/vnd.openxmlformats-officedocument.drawingml.chart+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const SHEET_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing" Target="../drawings/drawing1.xml"/>
</Relationships>"#;

const DRAWING_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart" Target="../charts/chart1.xml"/>
</Relationships>"#;

// cellXfs: 0 default, 1 bold header, 2 date-time, 3 two decimals (built-in format 2)
const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <numFmts count="1">
        <numFmt numFmtId="164" formatCode="yyyy-mm-dd hh:mm"/>
    </numFmts>
    <fonts count="2">
        <font><sz val="11"/><name val="Calibri"/><family val="2"/></font>
        <font><b/><sz val="11"/><name val="Calibri"/><family val="2"/></font>
    </fonts>
    <fills count="2">
        <fill><patternFill patternType="none"/></fill>
        <fill><patternFill patternType="gray125"/></fill>
    </fills>
    <borders count="1">
        <border><left/><right/><top/><bottom/><diagonal/></border>
    </borders>
    <cellStyleXfs count="1">
        <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
    </cellStyleXfs>
    <cellXfs count="4">
        <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
        <xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>
        <xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
        <xf numFmtId="2" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
    </cellXfs>
    <cellStyles count="1">
        <cellStyle name="Normal" xfId="0" builtinId="0"/>
    </cellStyles>
</styleSheet>"#;

fn workbook_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>
        <sheet name="{}" sheetId="1" r:id="rId1"/>
    </sheets>
</workbook>"#,
        escape_xml(SHEET_NAME)
    )
}

fn inline_string_cell(reference: &str, text: &str, style: Option<u32>) -> String {
    let style = style.map(|s| format!(r#" s="{}""#, s)).unwrap_or_default();
    format!(
        r#"<c r="{}" t="inlineStr"{}><is><t xml:space="preserve">{}</t></is></c>"#,
        reference,
        style,
        escape_xml(text)
    )
}

fn worksheet_xml(analysis: &ChannelAnalysis) -> String {
    let last_row = analysis.series.len() + 1;
    let mut content = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <dimension ref="A1:E{}"/>
    <cols>
        <col min="1" max="1" width="18" customWidth="1"/>
        <col min="2" max="2" width="14" customWidth="1"/>
        <col min="3" max="3" width="50" customWidth="1"/>
        <col min="4" max="5" width="16" customWidth="1"/>
    </cols>
    <sheetData>
        <row r="1">"#,
        last_row
    );

    for (column, header) in ["A", "B", "C", "D", "E"].iter().zip(HEADERS) {
        content.push_str(&inline_string_cell(
            &format!("{}1", column),
            header,
            Some(STYLE_HEADER),
        ));
    }
    content.push_str("</row>");

    for (index, (record, average)) in analysis.series.iter().enumerate() {
        let row = index + 2;
        content.push_str(&format!(
            r#"
        <row r="{row}"><c r="A{row}" s="{}"><v>{}</v></c>{}{}<c r="D{row}"><v>{}</v></c><c r="E{row}" s="{}"><v>{}</v></c></row>"#,
            STYLE_DATE,
            excel_serial(record.published_at),
            inline_string_cell(&format!("B{}", row), record.video_id.as_str(), None),
            inline_string_cell(&format!("C{}", row), &record.title, None),
            record.view_count,
            STYLE_DECIMAL,
            average,
        ));
    }

    content.push_str(
        r#"
    </sheetData>
    <drawing r:id="rId1"/>
</worksheet>"#,
    );
    content
}

fn drawing_xml() -> String {
    // Anchor column/row are zero-based: (6, 1) is G2
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
    <xdr:oneCellAnchor>
        <xdr:from><xdr:col>6</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>1</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>
        <xdr:ext cx="{}" cy="{}"/>
        <xdr:graphicFrame macro="">
            <xdr:nvGraphicFramePr><xdr:cNvPr id="2" name="Chart 1"/><xdr:cNvGraphicFramePr/></xdr:nvGraphicFramePr>
            <xdr:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/></xdr:xfrm>
            <a:graphic>
                <a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart">
                    <c:chart xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" r:id="rId1"/>
                </a:graphicData>
            </a:graphic>
        </xdr:graphicFrame>
        <xdr:clientData/>
    </xdr:oneCellAnchor>
</xdr:wsDr>"#,
        CHART_WIDTH_EMU, CHART_HEIGHT_EMU
    )
}

fn rich_title(text: &str) -> String {
    format!(
        r#"<c:title><c:tx><c:rich><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></c:rich></c:tx><c:overlay val="0"/></c:title>"#,
        escape_xml(text)
    )
}

fn line_series(index: u32, column: char, last_row: usize) -> String {
    let sheet = escape_xml(&format!("'{}'", SHEET_NAME));
    format!(
        r#"
            <c:ser>
                <c:idx val="{index}"/><c:order val="{index}"/>
                <c:tx><c:strRef><c:f>{sheet}!${column}$1</c:f></c:strRef></c:tx>
                <c:marker><c:symbol val="none"/></c:marker>
                <c:cat><c:numRef><c:f>{sheet}!$A$2:$A${last_row}</c:f></c:numRef></c:cat>
                <c:val><c:numRef><c:f>{sheet}!${column}$2:${column}${last_row}</c:f></c:numRef></c:val>
                <c:smooth val="0"/>
            </c:ser>"#
    )
}

fn chart_xml(channel_title: &str, rows: usize) -> String {
    let last_row = rows + 1;
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <c:chart>
        {title}
        <c:autoTitleDeleted val="0"/>
        <c:plotArea>
            <c:layout/>
            <c:lineChart>
                <c:grouping val="standard"/>
                <c:varyColors val="0"/>{views}{average}
                <c:marker val="1"/>
                <c:axId val="500000001"/>
                <c:axId val="500000002"/>
            </c:lineChart>
            <c:dateAx>
                <c:axId val="500000001"/>
                <c:scaling><c:orientation val="minMax"/></c:scaling>
                <c:delete val="0"/>
                <c:axPos val="b"/>
                {x_title}
                <c:numFmt formatCode="yyyy-mm-dd" sourceLinked="0"/>
                <c:majorTickMark val="out"/>
                <c:minorTickMark val="none"/>
                <c:tickLblPos val="nextTo"/>
                <c:crossAx val="500000002"/>
                <c:crosses val="autoZero"/>
                <c:auto val="1"/>
                <c:lblOffset val="100"/>
                <c:baseTimeUnit val="days"/>
            </c:dateAx>
            <c:valAx>
                <c:axId val="500000002"/>
                <c:scaling><c:orientation val="minMax"/></c:scaling>
                <c:delete val="0"/>
                <c:axPos val="l"/>
                <c:majorGridlines/>
                {y_title}
                <c:numFmt formatCode="General" sourceLinked="1"/>
                <c:majorTickMark val="out"/>
                <c:minorTickMark val="none"/>
                <c:tickLblPos val="nextTo"/>
                <c:crossAx val="500000001"/>
                <c:crosses val="autoZero"/>
                <c:crossBetween val="between"/>
            </c:valAx>
        </c:plotArea>
        <c:legend><c:legendPos val="r"/><c:overlay val="0"/></c:legend>
        <c:plotVisOnly val="1"/>
    </c:chart>
</c:chartSpace>"#,
        title = rich_title(&format!("View Counts for {}", channel_title)),
        views = line_series(0, 'D', last_row),
        average = line_series(1, 'E', last_row),
        x_title = rich_title("Upload Date"),
        y_title = rich_title("View Count"),
    )
}
