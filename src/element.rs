//! μDMA transfer elements

/// Describes a μDMA transfer element
///
/// The element decides the size and increment encodings written into a
/// channel's packed control word.
///
/// # Safety
///
/// The associated constant must be one of the size encodings the μDMA
/// controller defines. Do not implement this for your own types; the
/// implementations on `u8`, `u16`, and `u32` cover every encoding the
/// hardware supports.
pub unsafe trait Element: Copy {
    /// The control word size / increment encoding for this element
    const DATA_TRANSFER_ID: u32;
}

unsafe impl Element for u8 {
    const DATA_TRANSFER_ID: u32 = 0;
}

unsafe impl Element for u16 {
    const DATA_TRANSFER_ID: u32 = 1;
}

unsafe impl Element for u32 {
    const DATA_TRANSFER_ID: u32 = 2;
}
