//! Conversions between Excel-style A1 references and 0-based indexes.

/// Converts 0-based row & column indexes to an A1 reference such as `B3`.
pub fn index_to_reference(row: usize, col: usize) -> String {
    let mut letters = String::new();
    let mut col = col + 1;
    while col > 0 {
        col -= 1;
        letters.insert(0, (b'A' + (col % 26) as u8) as char);
        col /= 26;
    }
    format!("{}{}", letters, row + 1)
}

/// Parses an A1 reference (`B3`, `aa10`) into 0-based (row, col) indexes.
pub fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    Some((row_to_index(digits)?, col_to_index(letters)?))
}

/// Converts column letters (`A` = 0, `Z` = 25, `AA` = 26) to a 0-based index.
pub fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .to_ascii_uppercase()
        .bytes()
        .map(|byte| (byte - b'A') as usize + 1)
        .reduce(|index, digit| index * 26 + digit)
        .map(|col| col - 1)
}

/// Converts a 1-based row number string to a 0-based index.
pub fn row_to_index(digits: &str) -> Option<usize> {
    digits
        .parse::<usize>()
        .ok()
        .filter(|row| *row > 0)
        .map(|row| row - 1)
}
