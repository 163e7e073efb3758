//! Configuration errors.

use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Deser(#[from] toml::de::Error),

    #[error("{0}")]
    Ser(#[from] toml::ser::Error),

    #[error("{0}, line {1}")]
    Syntax(String, usize),
}

impl Error {
    /// Attach the line number to a TOML decoding error.
    pub fn config(source: &str, err: toml::de::Error) -> Self {
        let message = err.message().trim().to_string();

        let line = match err.span() {
            Some(span) => {
                let start = span.start.min(source.len());
                source
                    .get(..start)
                    .map(|before| before.matches('\n').count() + 1)
                    .unwrap_or(0)
            }
            None => 0,
        };

        Self::Syntax(message, line)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_line_number() {
        let source = "[general]\nworkers = 2\n\n[dataSources.pr]\nprimaryDataSourceName = = \"primary\"\n";
        let err = toml::from_str::<toml::Table>(source).unwrap_err();

        match Error::config(source, err) {
            Error::Syntax(_, line) => assert_eq!(line, 5),
            err => panic!("unexpected error: {}", err),
        }
    }
}
