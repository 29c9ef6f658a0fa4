use crate::error::ProvisionError;
use crate::models::RangeSpec;

/// Outputs per device for both modelled device classes
pub const OUTPUTS: usize = 8;

// Guards against a typo like "1-4000000000" allocating a huge vector
const MAX_RANGE_LEN: u64 = 65_536;

/// Expand a range spec into its ordered values.
///
/// `"A-B"` yields `A..=B` (A must not exceed B); `"a,b,c"` and explicit
/// lists are returned as written; a single number yields itself.
pub fn expand_range(spec: &RangeSpec) -> Result<Vec<u32>, ProvisionError> {
    match spec {
        RangeSpec::List(values) => Ok(values.clone()),
        RangeSpec::Single(value) => Ok(vec![*value]),
        RangeSpec::Text(text) => parse_range(text),
    }
}

/// Parse the textual form of a range
pub fn parse_range(text: &str) -> Result<Vec<u32>, ProvisionError> {
    let malformed = || ProvisionError::MalformedRange(text.to_string());
    let s = text.trim();

    let dash_re = regex_lite::Regex::new(r"^(\d+)\s*-\s*(\d+)$").ok();
    if let Some(caps) = dash_re.as_ref().and_then(|re| re.captures(s)) {
        let start: u32 = caps[1].parse().map_err(|_| malformed())?;
        let end: u32 = caps[2].parse().map_err(|_| malformed())?;
        if start > end || u64::from(end - start) >= MAX_RANGE_LEN {
            return Err(malformed());
        }
        return Ok((start..=end).collect());
    }

    let list_re = regex_lite::Regex::new(r"^\d+(\s*,\s*\d*)*$").ok();
    if list_re.as_ref().is_some_and(|re| re.is_match(s)) {
        return s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<u32>().map_err(|_| malformed()))
            .collect();
    }

    Err(malformed())
}

/// Pad `values` to `len` entries by repeating the last value (or `fallback`
/// when empty). Longer inputs are truncated to `len`. Never fails.
pub fn pad_to(values: Vec<u32>, len: usize, fallback: u32) -> Vec<u32> {
    let mut values = if values.is_empty() { vec![fallback] } else { values };
    let last = values[values.len() - 1];
    values.resize(len.max(values.len()), last);
    values.truncate(len);
    values
}
