#![allow(dead_code)]

use std::io::Cursor;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const VEHICLE_HEADER: [&str; 8] = ["品牌", "車型", "車長(mm)", "車寬(mm)", "車高(mm)", "巧思分類", "總價落點", "基本價"];

/// Rows of the vehicle sheet, header first.
pub fn vehicle_rows() -> Vec<Vec<&'static str>> {
    vec![
        VEHICLE_HEADER.to_vec(),
        vec!["Toyota", "Altis", "4630", "1780", "1435", "A", "2-3萬", "12000"],
        vec!["Toyota", "RAV4", "4600", "1855", "1685", "B", "3-4萬", "15000"],
        vec!["Honda", "Fit", "4100", "1695", "1540", "E", "1-2萬", "9000"],
        vec!["", "Orphan", "", "", "", "A", "", ""],
        vec!["Honda", "CR-V", "4691", "1866", "1681", "B", "3-4萬", "15000"],
    ]
}

/// Rows of the option price sheet, header first.
pub fn option_rows() -> Vec<Vec<&'static str>> {
    vec![
        vec!["巧思分類", "Wax", "Seal", "Glass"],
        vec!["A", "1000", "2000", ""],
        vec!["B", "1200", "NaN", "3000"],
        vec!["B", "1300", "2500", ""],
        vec!["C", "NaN", "NaN", "NaN"],
    ]
}

/// Builds an xlsx package; text goes to the shared string table, numbers stay inline.
pub fn xlsx(sheets: &[(&str, Vec<Vec<&str>>)]) -> Vec<u8> {
    let mut shared_strings = Vec::<String>::new();
    let mut worksheets = Vec::<String>::new();
    for (_, rows) in sheets {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#);
        for (row, values) in rows.iter().enumerate() {
            xml.push_str(&format!(r#"<row r="{}">"#, row + 1));
            for (col, value) in values.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let reference = format!("{}{}", (b'A' + col as u8) as char, row + 1);
                if value.parse::<f64>().is_ok() {
                    xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, value));
                } else {
                    let index = match shared_strings.iter().position(|string| string == value) {
                        Some(index) => index,
                        None => {
                            shared_strings.push(value.to_string());
                            shared_strings.len() - 1
                        }
                    };
                    xml.push_str(&format!(r#"<c r="{}" t="s"><v>{}</v></c>"#, reference, index));
                }
            }
            xml.push_str("</row>");
        }
        xml.push_str("</sheetData></worksheet>");
        worksheets.push(xml);
    }

    let mut workbook = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#);
    let mut relationships = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    for (index, (name, _)) in sheets.iter().enumerate() {
        workbook.push_str(&format!(r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#, name, index + 1, index + 1));
        relationships.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            index + 1,
            index + 1
        ));
    }
    workbook.push_str("</sheets></workbook>");
    relationships.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/></Relationships>"#,
        sheets.len() + 1
    ));

    let mut strings = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
        shared_strings.len()
    );
    for string in &shared_strings {
        strings.push_str(&format!("<si><t>{}</t></si>", string));
    }
    strings.push_str("</sst>");

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut part = |name: &str, content: &str| {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    };
    part("[Content_Types].xml", r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#);
    part("xl/workbook.xml", &workbook);
    part("xl/_rels/workbook.xml.rels", &relationships);
    part("xl/sharedStrings.xml", &strings);
    for (index, worksheet) in worksheets.iter().enumerate() {
        part(&format!("xl/worksheets/sheet{}.xml", index + 1), worksheet);
    }
    writer.finish().unwrap().into_inner()
}

/// The reference workbook: vehicles on `工作表1`, option prices on the second sheet.
pub fn reference_workbook() -> Vec<u8> {
    xlsx(&[("工作表1", vehicle_rows()), ("選項價格", option_rows())])
}

pub fn csv(rows: &[Vec<&str>]) -> String {
    rows.iter().map(|row| row.join(",")).collect::<Vec<String>>().join("\n") + "\n"
}

pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
