use ryu::Buffer;
use std::cell::RefCell;

#[inline]
pub fn fmt_f64(buf: &mut Buffer, value: f64) -> &str {
    debug_assert!(value.is_finite());
    let formatted = buf.format_finite(value);
    formatted.strip_suffix(".0").unwrap_or(formatted)
}

thread_local! {
    static FMT_BUF: RefCell<Buffer> = RefCell::new(Buffer::new());
}

#[inline]
pub fn with_fmt_buf<F, R>(f: F) -> R
where
    F: FnOnce(&mut Buffer) -> R,
{
    FMT_BUF.with(|b| f(&mut b.borrow_mut()))
}

/// Render a measurement value the way series and report rows print it.
pub fn render(value: f64) -> String {
    with_fmt_buf(|buf| fmt_f64(buf, value).to_owned())
}

/// Round to a fixed number of decimal places.
#[inline]
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
