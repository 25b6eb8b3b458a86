//! Office Open XML package helpers
use crate::error::QuoteError;
use crate::helpers::reader::UnifiedReader;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use zip::ZipArchive;

/// XML tag name for relationship elements in Excel files
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Signature of an OLE compound file; encrypted xlsx packages are wrapped in one
const CFB_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Opens an xlsx package and loads its worksheet list
///
/// # Arguments
/// * `file_name` - Name used in error messages
/// * `reader` - Package bytes
/// * `load_workbook` - Function to load the worksheet (name, zip path) pairs
pub(super) fn open<W>(file_name: &str, mut reader: UnifiedReader, load_workbook: W) -> Result<(
    ZipArchive<UnifiedReader>,
    Vec<(String, String)>
), QuoteError>
where
    W: Fn(&mut ZipArchive<UnifiedReader>) -> Result<Vec<(String, String)>, QuoteError>,
{
    if is_password_protected(&mut reader)? {
        Err(SpreadsheetError::SpreadsheetPasswordProtectedError(file_name.to_owned()))?;
    }

    let mut zip = ZipArchive::new(reader)?;
    let sheets = load_workbook(&mut zip)?;
    if sheets.is_empty() {
        Err(SpreadsheetError::SpreadsheetEmptyError(file_name.to_owned()))?
    }
    Ok((zip, sheets))
}

/// Loads worksheet relationships from an Excel file
///
/// # Returns
/// Mapping of relationship IDs to worksheet paths
pub(super) fn load_relationships(zip: &mut ZipArchive<UnifiedReader>, path: &str) -> Result<HashMap<String, String>, QuoteError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            // Only process worksheet relationships
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Normalizes a relationship target to a path inside the package
pub(crate) fn to_zip_path(path: Cow<'_, str>) -> String {
    if let Some(stripped) = path.strip_prefix('/') {
        stripped.to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

/// Checks for the compound-file signature and rewinds the reader
fn is_password_protected(reader: &mut UnifiedReader) -> Result<bool, QuoteError> {
    let mut signature = [0u8; 8];
    let protected = match reader.read_exact(&mut signature) {
        Ok(()) => signature == CFB_SIGNATURE,
        Err(_) => false,
    };
    reader.seek(SeekFrom::Start(0))?;
    Ok(protected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_path_normalization() {
        assert_eq!(to_zip_path(Cow::from("worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::from("/xl/worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::from("xl/worksheets/sheet2.xml")), "xl/worksheets/sheet2.xml");
    }

    #[test]
    fn compound_file_is_password_protected() {
        let mut bytes = CFB_SIGNATURE.to_vec();
        bytes.extend_from_slice(&[0u8; 32]);
        let mut reader = UnifiedReader::from_bytes(bytes);
        assert!(is_password_protected(&mut reader).unwrap());

        let mut reader = UnifiedReader::from_bytes(b"PK\x03\x04".to_vec());
        assert!(!is_password_protected(&mut reader).unwrap());
    }
}
