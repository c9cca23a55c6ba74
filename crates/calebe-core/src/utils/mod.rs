//! Utility functions for formatting and parsing display values.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{
    cpf_digits, format_cpf, format_date, format_optional, is_disabled_release_date, is_image_url,
    parse_api_date, parse_input_date, start_of_day, truncate_string,
};
