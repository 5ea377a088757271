use clap::ValueEnum;
use derive_more::Display;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Clone, Copy, ValueEnum, Default, Display, PartialEq, Eq)]
pub enum LogLevel {
    #[display("trace")]
    Trace,
    #[display("debug")]
    Debug,
    #[display("info")]
    Info,
    #[default]
    #[display("warn")]
    Warn,
    #[display("error")]
    Error,
    #[display("silent")]
    Silent,
}

impl LogLevel {
    /// `None` means no subscriber should be installed at all.
    pub fn to_tracing_filter(self) -> Option<LevelFilter> {
        match self {
            LogLevel::Trace => Some(LevelFilter::TRACE),
            LogLevel::Debug => Some(LevelFilter::DEBUG),
            LogLevel::Info => Some(LevelFilter::INFO),
            LogLevel::Warn => Some(LevelFilter::WARN),
            LogLevel::Error => Some(LevelFilter::ERROR),
            LogLevel::Silent => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(LogLevel::Trace, Some(LevelFilter::TRACE))]
    #[case(LogLevel::Warn, Some(LevelFilter::WARN))]
    #[case(LogLevel::Silent, None)]
    fn maps_to_tracing_filter(#[case] level: LogLevel, #[case] expected: Option<LevelFilter>) {
        assert_eq!(level.to_tracing_filter(), expected);
    }

    #[test]
    fn displays_like_its_cli_value() {
        assert_eq!(LogLevel::Silent.to_string(), "silent");
        assert_eq!(LogLevel::default().to_string(), "warn");
    }
}
