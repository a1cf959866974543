use std::path::Path;

use crate::ConfigError;

/// Load the list of target site URLs from a text file.
///
/// # Errors
///
/// Returns [`ConfigError::UrlListIo`] if the file cannot be read.
pub fn load_site_urls(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::UrlListIo {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(parse_site_list(&content))
}

/// Parses a site list: one URL per line, surrounding whitespace trimmed.
/// Blank lines and lines starting with `#` are skipped. Order is preserved.
#[must_use]
pub fn parse_site_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_site_list_skips_blank_and_comment_lines() {
        let content = "# production sites\nhttps://a.example\n\n   \n  https://b.example/login  \n#https://c.example\n";
        assert_eq!(
            parse_site_list(content),
            vec!["https://a.example", "https://b.example/login"]
        );
    }

    #[test]
    fn parse_site_list_handles_crlf() {
        let content = "https://a.example\r\nhttps://b.example\r\n";
        assert_eq!(
            parse_site_list(content),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn parse_site_list_empty_input() {
        assert!(parse_site_list("").is_empty());
    }

    #[test]
    fn load_site_urls_missing_file_is_io_error() {
        let err = load_site_urls(Path::new("/definitely/not/here/urls.txt")).unwrap_err();
        assert!(
            matches!(err, ConfigError::UrlListIo { ref path, .. } if path.ends_with("urls.txt")),
            "expected UrlListIo, got: {err:?}"
        );
    }

    #[test]
    fn load_site_urls_reads_file() {
        let dir = std::env::temp_dir().join(format!("promoscan-sites-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("urls.txt");
        std::fs::write(&path, "https://a.example\n# skip\nhttps://b.example\n").unwrap();
        let urls = load_site_urls(&path).unwrap();
        assert_eq!(urls, vec!["https://a.example", "https://b.example"]);
        std::fs::remove_dir_all(&dir).ok();
    }
}
