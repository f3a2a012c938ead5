use crate::mappings::{MENU_CONTROL, MENU_KEY, TEXT_KEY_COUNT, WHEEL_CONTROL, WHEEL_KEY};

/// Number of text keys on each row of the host grid
const KEYS_PER_ROW: u8 = 4;

/// Converts device key index to host control id
///
///   Device keys:          Host controls:
///   [0] [1] [2] [3]       [0/1] [0/2] [0/3] [0/4]
///   [4] [5] [6] [7]       [1/1] [1/2] [1/3] [1/4]
///   [8] menu button       menu
///   [9] wheel             wheel
///
/// Anything else has no control, which callers treat as a no-op
pub fn key_to_control(key: u8) -> Option<String> {
    match key {
        0..=3 => Some(format!("0/{}", key + 1)),
        4..=7 => Some(format!("1/{}", key - 3)),
        MENU_KEY => Some(MENU_CONTROL.to_string()),
        WHEEL_KEY => Some(WHEEL_CONTROL.to_string()),
        _ => None,
    }
}

/// Converts host control id to device key index, inverse of [`key_to_control`]
pub fn control_to_key(control_id: &str) -> Option<u8> {
    match control_id {
        MENU_CONTROL => return Some(MENU_KEY),
        WHEEL_CONTROL => return Some(WHEEL_KEY),
        _ => {}
    }

    let (row, column) = control_id.split_once('/')?;

    // Extra parts stay in `column` and fail to parse
    let row: u8 = row.parse().ok()?;
    let column: u8 = column.parse().ok()?;

    if !(1..=KEYS_PER_ROW).contains(&column) {
        return None;
    }

    let key = match row {
        0 => column - 1,
        1 => column + KEYS_PER_ROW - 1,
        _ => return None,
    };

    debug_assert!(key < TEXT_KEY_COUNT);

    Some(key)
}
