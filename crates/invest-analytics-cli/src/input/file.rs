use invest_analytics_core::AnalyticsConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// How a portfolio history file is laid out, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFormat {
    /// `AnalysisInput` document
    Json,
    /// `date,principal,market_value,<benchmark>...` rows
    Csv,
}

impl HistoryFormat {
    pub fn of(path: &str) -> Self {
        let csv = Path::new(path)
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("txt"))
            .unwrap_or(false);
        if csv {
            HistoryFormat::Csv
        } else {
            HistoryFormat::Json
        }
    }
}

/// Read a history file as text, dropping a spreadsheet byte-order mark.
pub fn read_history(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    let text = read_text(&resolve_path(path)?)?;
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// Load analytics settings from YAML. JSON is accepted as a YAML subset.
pub fn read_config(path: &str) -> Result<AnalyticsConfig, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let config: AnalyticsConfig = serde_yaml::from_str(&read_text(&canonical)?)
        .map_err(|e| format!("Failed to parse config '{}': {}", canonical.display(), e))?;
    config.validate()?;
    Ok(config)
}

fn read_text(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e).into())
}

fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };
    if !canonical.is_file() {
        return Err(format!("No such history or config file: {}", canonical.display()).into());
    }
    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_by_extension() {
        assert_eq!(HistoryFormat::of("history.CSV"), HistoryFormat::Csv);
        assert_eq!(HistoryFormat::of("input.json"), HistoryFormat::Json);
        assert_eq!(HistoryFormat::of("noext"), HistoryFormat::Json);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = read_history("/definitely/not/here.csv").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }
}
