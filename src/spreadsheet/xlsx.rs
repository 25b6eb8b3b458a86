use crate::error::QuoteError;
use crate::helpers::reader::UnifiedReader;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::excel;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::io::BufReader;
use zip::read::ZipFile;
use zip::ZipArchive;

const TAG_SHARED_STRING_ITEM: QName = QName(b"si");
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");
const TAG_TEXT: QName = QName(b"t");
const TAG_SHEET: QName = QName(b"sheet");
const TAG_ROW: QName = QName(b"row");
const TAG_CELL: QName = QName(b"c");
const TAG_INLINE_STRING: QName = QName(b"is");
const TAG_VALUE: QName = QName(b"v");

/// An Office Open XML workbook (`.xlsx` or `.xlsm`).
pub struct XlsxSpreadsheet {
    pub name: String,
    zip: ZipArchive<UnifiedReader>,
    /// Worksheets as (name, part path) in workbook order
    sheets: Vec<(String, String)>,
    /// Loaded on first read
    shared_strings: Option<Vec<String>>,
}

impl XlsxSpreadsheet {
    /// Opens a workbook from a local path or `file://` URL.
    pub fn open(file_name: &str) -> Result<XlsxSpreadsheet, QuoteError> {
        Self::from_reader(file_name, UnifiedReader::new(file_name)?)
    }

    /// Opens a workbook package held in memory.
    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> Result<XlsxSpreadsheet, QuoteError> {
        Self::from_reader(name, UnifiedReader::from_bytes(bytes))
    }

    fn from_reader(name: &str, reader: UnifiedReader) -> Result<XlsxSpreadsheet, QuoteError> {
        let (zip, sheets) = excel::open(name, reader, load_workbook)?;
        log::debug!("Opened '{}' with sheets {:?}", name, sheets.iter().map(|(name, _)| name).collect::<Vec<_>>());
        Ok(XlsxSpreadsheet {
            name: name.to_owned(),
            zip,
            sheets,
            shared_strings: None,
        })
    }

    /// Reads `xl/sharedStrings.xml`; a workbook without text cells may omit it.
    fn load_shared_strings(&mut self) -> Result<Vec<String>, QuoteError> {
        let mut shared_strings = Vec::<String>::new();
        let mut reader = match self.zip.xml_reader("xl/sharedStrings.xml")? {
            Some(reader) => reader,
            None => return Ok(shared_strings),
        };

        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
                let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
                shared_strings.push(string);
            }
        });
        Ok(shared_strings)
    }
}

impl Spreadsheet for XlsxSpreadsheet {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.to_owned()).collect()
    }

    /// Cells outside the criteria range are skipped; `t="s"` values are resolved
    /// against the shared string table.
    fn read_sheets(&mut self, criteria: &Criteria) -> Result<Vec<Sheet>, QuoteError> {
        if self.shared_strings.is_none() {
            self.shared_strings = Some(self.load_shared_strings()?);
        }
        let shared_strings = self.shared_strings.as_deref().unwrap_or_default();

        let mut sheets = Vec::<Sheet>::new();
        for (sheet_name, zip_path) in &self.sheets {
            if criteria.sheet_limit_reached(sheets.len()) {
                break;
            } else if !criteria.accept(sheet_name) {
                continue;
            }

            let mut sheet = Sheet::new(&self.name, sheet_name, criteria.range, criteria.rows_limit, criteria.skip_empty_rows);
            let mut row_count = 0usize;
            let mut col_count = 0usize;
            let mut row = 0usize;
            let mut col = 0usize;
            let mut kind = CellType::default();
            let mut is_shared = false;
            let mut value = String::new();
            let mut reader = self.zip.xml_reader(zip_path)?
                .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;
            match_xml_events!(reader => {
                Event::End(event) if event.name() == TAG_ROW => {
                    row_count += 1;
                    col_count = 0;
                }
                Event::Start(event) if event.name() == TAG_CELL => {
                    (row, col) = event.get_attribute_value("r")?
                        .and_then(|reference| reference_to_index(&reference))
                        .unwrap_or((row_count, col_count));
                    row_count = row;
                    col_count = col + 1;
                    value.clear();
                    if sheet.after_row_upper_bound(row) {
                        break;
                    } else if sheet.contains(row, col) {
                        let type_attribute = event.get_attribute_value("t")?;
                        is_shared = type_attribute.as_deref() == Some("s");
                        kind = match cell::from_type_attribute(type_attribute.as_deref()) {
                            CellType::Error if criteria.error_as_null => CellType::Empty,
                            kind => kind,
                        };
                    } else {
                        kind = CellType::default();
                    }
                }
                Event::Start(event) if kind != CellType::Empty && event.name() == TAG_INLINE_STRING => {
                    value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
                }
                Event::Start(event) if kind != CellType::Empty && event.name() == TAG_VALUE => {
                    value = read_string_value(&mut reader, TAG_VALUE, true)?;
                }
                Event::End(event) if kind != CellType::Empty && !value.is_empty() && event.name() == TAG_CELL => {
                    if kind == CellType::Error {
                        Err(SpreadsheetError::CellValueError(
                            sheet.file_name.to_owned(),
                            sheet.name.to_owned(),
                            index_to_reference(row, col),
                            value.to_owned(),
                        ))?
                    }
                    if criteria.end_at_empty_row && sheet.is_after_gap(row) {
                        break;
                    }
                    if is_shared {
                        let index = value.trim().parse::<usize>()?;
                        value = shared_strings.get(index).cloned().ok_or_else(|| SpreadsheetError::SharedStringIndexError(
                            sheet.file_name.to_owned(),
                            sheet.name.to_owned(),
                            index_to_reference(row, col),
                            index,
                        ))?;
                    }
                    if !value.is_empty() {
                        sheet.push(Cell {
                            row,
                            col,
                            kind,
                            value: std::mem::take(&mut value),
                        });
                    }
                    kind = CellType::default();
                },
            });
            log::debug!("Read {} cells from sheet '{}' of '{}'", sheet.cells.len(), sheet.name, sheet.file_name);
            sheets.push(sheet);
        }

        Ok(sheets)
    }
}

/// Lists worksheets from `xl/workbook.xml`, resolving each `r:id` through the workbook rels.
fn load_workbook(zip: &mut ZipArchive<UnifiedReader>) -> Result<Vec<(String, String)>, QuoteError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::FileError("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&id.to_string()) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
    });
    Ok(sheets)
}

/// Collects the text up to `end_tag`, leaving out phonetic (furigana) runs.
///
/// Rich text items keep their text in `<t>` children; `<v>` values are text directly,
/// which `is_text_content` selects.
fn read_string_value(
    reader: &mut XmlReader<BufReader<ZipFile<'_, UnifiedReader>>>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, QuoteError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_bytes_text(&event)?,
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::range::Range;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const WORKBOOK: &str = r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>
        <sheet name="工作表1" sheetId="1" r:id="rId1"/><sheet name="選項價格" sheetId="2" r:id="rId2"/>
    </sheets></workbook>"#;

    const RELATIONSHIPS: &str = r#"<Relationships>
        <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
        <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/>
        <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
    </Relationships>"#;

    const SHARED_STRINGS: &str = r#"<sst>
        <si><t>品牌</t></si>
        <si><r><t>車</t></r><r><t>型</t></r><rPh sb="0" eb="1"><t>くるま</t></rPh></si>
        <si><t>Toyota</t></si>
    </sst>"#;

    const VEHICLES: &str = r#"<worksheet><sheetData>
        <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
        <row r="2"><c r="A2" t="s"><v>2</v></c><c t="inlineStr"><is><t>Altis &amp; Cross</t></is></c><c r="C2"><v>4630</v></c></row>
        <row r="4"><c r="A4" t="b"><v>1</v></c><c r="B4" t="e"><v>#N/A</v></c></row>
    </sheetData></worksheet>"#;

    fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn workbook() -> XlsxSpreadsheet {
        XlsxSpreadsheet::from_bytes("qiaosi.xlsx", package(&[
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", RELATIONSHIPS),
            ("xl/sharedStrings.xml", SHARED_STRINGS),
            ("xl/worksheets/sheet1.xml", VEHICLES),
            ("xl/worksheets/sheet2.xml", "<worksheet><sheetData/></worksheet>"),
        ])).unwrap()
    }

    fn values(sheet: &Sheet) -> Vec<(String, CellType, String)> {
        sheet.cells.iter().map(|cell| (cell.reference(), cell.kind, cell.value.to_owned())).collect()
    }

    #[test]
    fn sheet_names_follow_workbook_order() {
        assert_eq!(workbook().sheet_names(), vec!["工作表1", "選項價格"]);
    }

    #[test]
    fn read_cells() {
        let sheets = workbook().read_sheets(&Criteria::default()).unwrap();
        assert_eq!(sheets.len(), 2);
        assert_eq!(values(&sheets[0]), vec![
            ("A1".to_owned(), CellType::Text, "品牌".to_owned()),
            ("B1".to_owned(), CellType::Text, "車型".to_owned()),
            ("A2".to_owned(), CellType::Text, "Toyota".to_owned()),
            ("B2".to_owned(), CellType::Text, "Altis & Cross".to_owned()),
            ("C2".to_owned(), CellType::Number, "4630".to_owned()),
            ("A4".to_owned(), CellType::Boolean, "1".to_owned()),
        ]);
        assert!(sheets[1].is_empty());
    }

    #[test]
    fn error_cells_fail_unless_null() {
        let criteria = Criteria {
            error_as_null: false,
            ..Criteria::default()
        };
        let error = workbook().read_sheets(&criteria).err().expect("error cell in B4");
        assert!(matches!(error, QuoteError::SpreadsheetError(SpreadsheetError::CellValueError(_, _, ref reference, _)) if reference == "B4"));
    }

    #[test]
    fn range_and_gap_stop_reading() {
        let criteria = Criteria {
            range: Some(Range::try_from("A1:B2").unwrap()),
            ..Criteria::for_sheet(glob::Pattern::new("工作表*").unwrap())
        };
        let sheets = workbook().read_sheets(&criteria).unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].cells.len(), 4);

        let criteria = Criteria {
            end_at_empty_row: true,
            ..Criteria::default()
        };
        let sheets = workbook().read_sheets(&criteria).unwrap();
        assert_eq!(sheets[0].cells.len(), 5);
    }

    #[test]
    fn package_without_sheets_is_empty() {
        let bytes = package(&[
            ("xl/workbook.xml", "<workbook><sheets/></workbook>"),
            ("xl/_rels/workbook.xml.rels", "<Relationships/>"),
        ]);
        let error = XlsxSpreadsheet::from_bytes("empty.xlsx", bytes).err().expect("no sheets");
        assert!(matches!(error, QuoteError::SpreadsheetError(SpreadsheetError::SpreadsheetEmptyError(_))));
    }
}
