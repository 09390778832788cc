use crate::error::Result;
use crate::types::ClassDescriptor;
use std::io::Write;

/// The whole result as one JSON array
pub fn to_json(classes: &[ClassDescriptor], pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(classes)?
    } else {
        serde_json::to_string(classes)?
    };
    Ok(json)
}

/// Serialize completely before writing, so a failure never leaves partial output behind
pub fn write_json<W: Write>(mut writer: W, classes: &[ClassDescriptor], pretty: bool) -> Result<()> {
    let json = to_json(classes, pretty)?;
    writeln!(writer, "{json}")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_is_an_empty_array() {
        assert_eq!(to_json(&[], false).unwrap(), "[]");
        let mut buf = Vec::new();
        write_json(&mut buf, &[], true).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "[]\n");
    }
}
