//! Terminal QR rendering.

use wapair_core::error::PairError;

/// Generate a compact QR code for terminal display using Unicode half-block characters.
///
/// Packs two rows of modules into one line of text using `▀`, `▄`, `█`, and space,
/// with a one-module quiet zone.
pub fn generate_qr_terminal(qr_data: &str) -> Result<String, PairError> {
    use qrcode::{Color, EcLevel, QrCode};

    let code = QrCode::with_error_correction_level(qr_data.as_bytes(), EcLevel::L)
        .map_err(|e| PairError::Session(format!("QR generation failed: {e}")))?;

    let width = code.width();
    let colors: Vec<Color> = code.into_colors();
    let quiet = 1usize;
    let size = width + quiet * 2;
    let is_dark = |row: usize, col: usize| -> bool {
        let (Some(r), Some(c)) = (row.checked_sub(quiet), col.checked_sub(quiet)) else {
            return false;
        };
        r < width && c < width && colors[r * width + c] == Color::Dark
    };

    let mut out = String::with_capacity(size * (size / 2 + 1) * 3);
    for row in (0..size).step_by(2) {
        for col in 0..size {
            out.push(match (is_dark(row, col), is_dark(row + 1, col)) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        out.push('\n');
    }

    Ok(out)
}

/// Print a QR payload to stdout for the operator to scan.
pub(crate) fn print_qr(qr_data: &str) {
    match generate_qr_terminal(qr_data) {
        Ok(rendered) => {
            println!("\nScan this QR code with WhatsApp > Linked Devices:\n");
            println!("{rendered}");
        }
        Err(e) => tracing::warn!("{e}"),
    }
}
