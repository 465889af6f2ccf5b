// Error reporting and argument validation for the command line

use crate::flow::Frequency;

/// Print an error with its cause chain and return the process exit code.
///
/// Everything that reaches here is a user-facing problem (bad config,
/// unreadable input, unwritable output): exit code 1.
pub fn report(err: &anyhow::Error) -> i32 {
    eprintln!("Error: {}", err);
    let mut chain = err.chain().skip(1).peekable();
    if chain.peek().is_some() {
        eprintln!("\nCaused by:");
        for (indent, cause) in chain.enumerate() {
            eprintln!("{:indent$}  {}", "", cause, indent = indent);
        }
    }
    1
}

/// Validate a count that must be at least one (trials, bins, item limit)
pub fn parse_positive(value: &str) -> Result<usize, String> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("Invalid number: '{}'. Expected a positive integer.", value))
        .and_then(|n| {
            if n > 0 {
                Ok(n)
            } else {
                Err("Value must be at least 1".to_string())
            }
        })
}

/// Validate a quantile in 0..=1, also accepting percentages like "85%"
pub fn parse_quantile(value: &str) -> Result<f64, String> {
    let trimmed = value.trim();
    let (number, scale) = match trimmed.strip_suffix('%') {
        Some(pct) => (pct, 100.0),
        None => (trimmed, 1.0),
    };
    let q = number
        .parse::<f64>()
        .map_err(|_| format!("Invalid quantile: '{}'", value))?
        / scale;
    if (0.0..=1.0).contains(&q) {
        Ok(q)
    } else {
        Err(format!("Quantile {} is outside 0..1", value))
    }
}

/// Parse a sampling frequency (day or week)
pub fn parse_frequency(value: &str) -> Result<Frequency, String> {
    Frequency::from_str(value)
        .ok_or_else(|| format!("Invalid frequency: '{}'. Use day or week.", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use anyhow::Context;

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive("3"), Ok(3));
        assert_eq!(parse_positive(" 100 "), Ok(100));
        assert!(parse_positive("0").is_err());
        assert!(parse_positive("-1").is_err());
        assert!(parse_positive("many").is_err());
    }

    #[test]
    fn test_parse_quantile() {
        assert_eq!(parse_quantile("0.85"), Ok(0.85));
        assert_eq!(parse_quantile("50%"), Ok(0.5));
        assert!(parse_quantile("1.5").is_err());
        assert!(parse_quantile("abc").is_err());
    }

    #[test]
    fn test_parse_frequency() {
        assert_eq!(parse_frequency("week"), Ok(Frequency::Week));
        assert_eq!(parse_frequency("D"), Ok(Frequency::Day));
        assert!(parse_frequency("fortnight").is_err());
    }

    #[test]
    fn test_report_exit_code() {
        let err = anyhow::Error::new(ConfigError::MissingCompleteStep);
        assert_eq!(report(&err), 1);

        let io: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = io.context("Failed to open issue export").unwrap_err();
        assert_eq!(report(&err), 1);
    }
}
