use crate::error::{PicError, Result};

pub fn check_positive(value: usize, name: &str) -> Result<()> {
    if value == 0 {
        return Err(PicError::InvalidParameter(format!(
            "Value of {name} should be above 0"
        )));
    }
    Ok(())
}

pub fn check_equal_length(
    left_len: usize,
    right_len: usize,
    left_name: &str,
    right_name: &str,
) -> Result<()> {
    if left_len != right_len {
        return Err(PicError::InvalidParameter(format!(
            "Length of {left_name} ({left_len}) and {right_name} ({right_len}) should be equal"
        )));
    }
    Ok(())
}

/// Checks `min < value <= max`.
pub fn check_half_open(value: f64, min: f64, max: f64, name: &str) -> Result<()> {
    check_finite(value, name)?;
    if value <= min || value > max {
        return Err(PicError::InvalidParameter(format!(
            "Value of {name} should be in ({min}, {max}], got {value}"
        )));
    }
    Ok(())
}

/// Checks `min <= value <= max`.
pub fn check_closed(value: f64, min: f64, max: f64, name: &str) -> Result<()> {
    check_finite(value, name)?;
    if value < min || value > max {
        return Err(PicError::InvalidParameter(format!(
            "Value of {name} should be in [{min}, {max}], got {value}"
        )));
    }
    Ok(())
}

pub fn check_non_negative(value: f64, name: &str) -> Result<()> {
    check_finite(value, name)?;
    if value < 0.0 {
        return Err(PicError::InvalidParameter(format!(
            "Value of {name} should not be negative, got {value}"
        )));
    }
    Ok(())
}

pub fn check_finite(value: f64, name: &str) -> Result<()> {
    if !value.is_finite() {
        return Err(PicError::InvalidParameter(format!(
            "Value of {name} should be finite"
        )));
    }
    Ok(())
}
